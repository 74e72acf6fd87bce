use axum::extract::State;
use axum::response::Redirect;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::auth::{self, SESSION_LOGGED_IN_KEY};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub password: String,
}

/// Checks the submitted password against the configured bcrypt hash and sets
/// the session flag. A missing hash is a server configuration error, never an
/// open door.
#[instrument(skip(state, session, payload), err)]
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginPayload>,
) -> Result<Json<Value>, AppError> {
    let password_hash = state.config.app_password_hash.clone().ok_or_else(|| {
        AppError::ConfigError("APP_PASSWORD_HASH is not configured".to_string())
    })?;

    if !auth::verify_password(payload.password, password_hash).await? {
        warn!("Login rejected: wrong password");
        return Err(AppError::Forbidden);
    }

    session
        .insert(SESSION_LOGGED_IN_KEY, true)
        .await
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    info!("Login successful, session flag set");

    Ok(Json(json!({"success": true, "message": "Logged in"})))
}

/// Destroys the session and sends the browser back to the login form.
#[instrument(skip(session))]
pub async fn logout_handler(session: Session) -> Result<Redirect, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    info!("Session cleared on logout");
    Ok(Redirect::to("/login"))
}
