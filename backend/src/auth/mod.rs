//! Password gate and per-request session context.
//!
//! There is no user database: the service is gated by a single bcrypt
//! password hash supplied through configuration. The session carries exactly
//! two values, the logged-in flag and the selected review mode, and every
//! handler reads them through the explicit [`SessionContext`] extractor
//! rather than ambient state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::warn;

use crate::errors::AppError;
use crate::models::ReviewMode;

pub const SESSION_LOGGED_IN_KEY: &str = "logged_in";
pub const SESSION_MODE_KEY: &str = "mode";

/// Verifies a login password against the configured bcrypt hash.
///
/// Runs on the blocking pool; bcrypt verification is deliberately slow.
pub async fn verify_password(candidate: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(candidate.as_bytes(), &hash))
        .await
        .map_err(|e| AppError::InternalServerErrorGeneric(format!("join error: {e}")))?
        .map_err(|e| AppError::InternalServerErrorGeneric(format!("bcrypt failure: {e}")))
}

/// Hashes a password with the default bcrypt cost. Used by tests and by the
/// operator tooling that produces `APP_PASSWORD_HASH`.
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    bcrypt::hash(plaintext.as_bytes(), bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerErrorGeneric(format!("bcrypt failure: {e}")))
}

/// Per-request view of the session: authenticated flag plus review mode.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub logged_in: bool,
    pub mode: ReviewMode,
}

impl SessionContext {
    /// Errors with 401 unless the session has passed the login gate.
    pub fn require_login(&self) -> Result<(), AppError> {
        if self.logged_in {
            Ok(())
        } else {
            warn!("Request rejected: no authenticated session");
            Err(AppError::Unauthorized("Not logged in".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::SessionError(msg.to_string()))?;

        let logged_in = session
            .get::<bool>(SESSION_LOGGED_IN_KEY)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))?
            .unwrap_or(false);
        let mode = session
            .get::<ReviewMode>(SESSION_MODE_KEY)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))?
            .unwrap_or_default();

        Ok(Self { logged_in, mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verify_password_accepts_matching_hash() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(verify_password("correct horse".into(), hash.clone())
            .await
            .expect("verify"));
        assert!(!verify_password("wrong".into(), hash).await.expect("verify"));
    }

    #[test]
    fn require_login_rejects_anonymous_context() {
        let ctx = SessionContext {
            logged_in: false,
            mode: ReviewMode::Legal,
        };
        assert!(matches!(
            ctx.require_login(),
            Err(AppError::Unauthorized(_))
        ));
        let ctx = SessionContext {
            logged_in: true,
            mode: ReviewMode::Creator,
        };
        assert!(ctx.require_login().is_ok());
    }
}
