use async_trait::async_trait;
use genai::{
    chat::{ChatMessage, ChatOptions, ChatRequest, ChatResponse},
    Client, ClientBuilder,
};
use std::sync::Arc;

use super::AiClient;
use crate::errors::AppError;

/// Wrapper struct around the genai::Client to implement our AiClient trait.
pub struct PactGeminiClient {
    inner: Client,
}

#[async_trait]
impl AiClient for PactGeminiClient {
    /// Executes a chat request using the underlying genai::Client.
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        self.inner
            .exec_chat(model_name, request, config_override.as_ref())
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl AiClient for Arc<PactGeminiClient> {
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        (**self).exec_chat(model_name, request, config_override).await
    }
}

/// Builds the PactGeminiClient wrapper. The genai client reads its API key
/// from the environment (GEMINI_API_KEY).
pub fn build_gemini_client() -> Result<Arc<PactGeminiClient>, AppError> {
    let client = ClientBuilder::default().build();
    Ok(Arc::new(PactGeminiClient { inner: client }))
}

/// Executes a single-turn chat and returns the text content of the reply.
pub async fn generate_simple_response(
    client: &dyn AiClient,
    user_message: String,
    model_name: &str,
) -> Result<String, AppError> {
    let chat_request = ChatRequest::default().append_message(ChatMessage::user(user_message));
    tracing::debug!(%model_name, "Executing chat with specified model via trait");
    let response = client.exec_chat(model_name, chat_request, None).await?;
    let content = response
        .content_text_as_str()
        .ok_or_else(|| AppError::LlmClientError("No text content in LLM response".to_string()))?
        .to_string();
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_gemini_client_wrapper_ok() {
        let result = build_gemini_client();
        assert!(
            result.is_ok(),
            "Failed to build Gemini client wrapper: {:?}",
            result.err()
        );
    }
}
