use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::auth::{SessionContext, SESSION_MODE_KEY};
use crate::errors::AppError;
use crate::models::ReviewMode;

/// Switches the session's review mode. Pure selection: nothing outside the
/// session changes.
#[instrument(skip(ctx, session), err)]
pub async fn set_mode_handler(
    ctx: SessionContext,
    session: Session,
    Path(mode): Path<String>,
) -> Result<Json<Value>, AppError> {
    ctx.require_login()?;

    let mode: ReviewMode = mode
        .parse()
        .map_err(|()| AppError::BadRequest(format!("Unknown review mode: {mode:?}")))?;

    session
        .insert(SESSION_MODE_KEY, mode)
        .await
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    info!(%mode, "Review mode switched");

    Ok(Json(json!({"success": true, "mode": mode})))
}

pub async fn get_mode_handler(ctx: SessionContext) -> Result<Json<Value>, AppError> {
    ctx.require_login()?;
    Ok(Json(json!({"mode": ctx.mode})))
}
