use async_trait::async_trait;
use genai::chat::{ChatOptions, ChatRequest, ChatResponse};

use crate::errors::AppError;

pub mod gemini_client;

pub use gemini_client::{build_gemini_client, PactGeminiClient};

/// Trait defining the interface for AI client operations.
///
/// The pipeline runner talks to the model exclusively through this trait, so
/// tests can substitute a scripted mock for the real Gemini client.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Executes a chat request with the AI model.
    ///
    /// # Arguments
    ///
    /// * `model_name` - The identifier for the specific AI model to use.
    /// * `request` - The chat request containing messages and system prompt.
    /// * `config_override` - Optional generation configuration overrides.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ChatResponse` on success, or an `AppError`
    /// on failure.
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError>;
}
