// backend/src/errors.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// AppError is Clone so mocks can store canned results; every wrapped error is
// therefore carried as its String rendering.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    // --- Authentication/Authorization Errors ---
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Session Error: {0}")]
    SessionError(String),

    // --- Request/Input Errors ---
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("File upload error: {0}")]
    FileUploadError(String),

    #[error("Could not extract text from document: {0}")]
    ExtractionFailed(String),

    // --- Pipeline Errors ---
    #[error("Contract review failed: {0}")]
    PipelineFailed(String),

    #[error("Contract review timed out after {0} seconds")]
    PipelineTimeout(u64),

    // --- External Service Errors ---
    #[error("LLM Client Error: {0}")]
    LlmClientError(String),

    #[error("Email delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Web search failed: {0}")]
    SearchFailed(String),

    #[error("HTTP Request Error: {0}")]
    HttpRequestError(String),

    // --- General/Internal Errors ---
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Serialization Error: {0}")]
    SerializationError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerErrorGeneric(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequestError(err.to_string())
    }
}

impl From<genai::Error> for AppError {
    fn from(err: genai::Error) -> Self {
        Self::LlmClientError(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::FileUploadError(err.to_string())
    }
}

// --- IntoResponse Implementation ---
// Every error path returns the upload-response shape the frontend expects:
// {"success": false, "message": "..."}.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // 4xx Client Errors
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Invalid password".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::FileUploadError(e) => {
                error!("File upload error: {}", e);
                (StatusCode::BAD_REQUEST, "File upload failed".to_string())
            }
            AppError::ExtractionFailed(e) => {
                error!("Document extraction error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Could not read the uploaded document: {e}"),
                )
            }

            // 5xx Server Errors. The pipeline/delivery messages are passed
            // through so operators can tell hangs from logic errors.
            AppError::PipelineFailed(msg) => {
                error!("Pipeline failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {msg}"))
            }
            AppError::PipelineTimeout(secs) => {
                error!("Pipeline timed out after {}s", secs);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Contract review timed out after {secs} seconds"),
                )
            }
            AppError::DeliveryFailed(msg) => {
                error!("Email delivery failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not deliver the summary email: {msg}"),
                )
            }
            AppError::LlmClientError(e) => {
                error!("LLM client error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI service error".to_string(),
                )
            }
            AppError::SearchFailed(e) => {
                error!("Web search error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Web search error".to_string(),
                )
            }
            AppError::HttpRequestError(e) => {
                error!("HTTP request error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream request error".to_string(),
                )
            }
            AppError::SessionError(e) => {
                error!("Session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Session management error".to_string(),
                )
            }
            AppError::ConfigError(msg) => {
                error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AppError::IoError(e) => {
                error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File system error".to_string(),
                )
            }
            AppError::SerializationError(e) => {
                error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Data formatting error".to_string(),
                )
            }
            AppError::InternalServerErrorGeneric(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
