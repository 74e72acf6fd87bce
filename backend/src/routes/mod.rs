pub mod auth;
pub mod health;
pub mod mode;
pub mod pages;
pub mod upload;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppState;

/// Builds the full application router, session layer included, so the
/// server binary and the integration tests serve an identical stack.
pub fn build_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.session_cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(8)));

    Router::new()
        .route("/", get(pages::index_handler))
        .route(
            "/login",
            get(pages::login_page_handler).post(auth::login_handler),
        )
        .route("/logout", get(auth::logout_handler))
        .route("/set_mode/{mode}", post(mode::set_mode_handler))
        .route("/get_mode", get(mode::get_mode_handler))
        .route("/upload", post(upload::upload_contract_handler))
        .route("/api/health", get(health::health_check))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new()))
        .with_state(state)
}
