use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

use pact_backend::config::Config;
use pact_backend::logging::init_subscriber;
use pact_backend::routes::build_router;
use pact_backend::state::AppState;
use pact_backend::state_builder::AppStateServicesBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_subscriber();

    tracing::info!("Starting Pact backend server...");

    let config = Arc::new(Config::load().context("failed to load configuration")?);
    tracing::debug!(?config, "Configuration loaded");

    if config.app_password_hash.is_none() {
        // Without the gate hash nobody can log in; fail loudly at startup
        // instead of serving an unusable instance.
        anyhow::bail!("APP_PASSWORD_HASH must be set");
    }

    let services = AppStateServicesBuilder::new(config.clone())
        .build()
        .context("failed to build application services")?;
    let state = AppState::new(config.clone(), services);

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Listening for connections");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;
    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
