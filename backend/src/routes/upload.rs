use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{info, instrument};

use crate::auth::SessionContext;
use crate::errors::AppError;
use crate::models::UploadResponse;
use crate::services::review_service::{run_contract_review, ReviewRequest};
use crate::state::AppState;
use crate::text_processing::extract_contract_text;

/// Accepts the multipart upload (`contract` file + `user_email` field) and
/// drives the full review flow. Validation failures return 400 before any
/// pipeline work starts.
#[instrument(skip(state, ctx, multipart), fields(mode = %ctx.mode), err)]
pub async fn upload_contract_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    ctx.require_login()?;

    let mut contract: Option<(String, Bytes)> = None;
    let mut user_email: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "contract" => {
                let filename = field.file_name().unwrap_or("contract").to_string();
                let data = field.bytes().await?;
                contract = Some((filename, data));
            }
            "user_email" => {
                user_email = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = contract else {
        return Err(AppError::BadRequest("Missing file or email".to_string()));
    };
    let Some(user_email) = user_email.filter(|e| !e.trim().is_empty()) else {
        return Err(AppError::BadRequest("Missing file or email".to_string()));
    };
    let user_email = user_email.trim().to_string();

    info!(%filename, size = bytes.len(), "Contract upload received");

    // PDF extraction is CPU-bound; keep it off the async worker.
    let contract_text =
        tokio::task::spawn_blocking(move || extract_contract_text(&filename, &bytes))
            .await
            .map_err(|e| AppError::InternalServerErrorGeneric(format!("join error: {e}")))??;

    let outcome = run_contract_review(
        &state,
        ReviewRequest {
            mode: ctx.mode,
            contract_text,
            user_email,
        },
    )
    .await?;

    Ok(Json(UploadResponse {
        success: true,
        message: outcome.message,
    }))
}
