//! Web search client used by the pipeline's research step.
//!
//! Wraps the Tavily Search API: query string in, ranked snippets plus an
//! optional synthesized answer out. The pipeline consumes the rendered
//! digest as prompt context; nothing else in the service touches this.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::errors::AppError;

const TAVILY_API_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 5;
const SNIPPET_CHARS: usize = 200;

/// Search outcome: an optional synthesized answer plus ranked hits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchDigest {
    pub answer: Option<String>,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl SearchDigest {
    /// Renders the digest as prompt-ready text: summary line first, then the
    /// top three hits with truncated snippets and their source URLs.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(answer) = &self.answer {
            parts.push(format!("**Summary:** {answer}"));
        }
        for hit in self.results.iter().take(3) {
            let snippet = if hit.content.chars().count() > SNIPPET_CHARS {
                let truncated: String = hit.content.chars().take(SNIPPET_CHARS).collect();
                format!("{truncated}...")
            } else {
                hit.content.clone()
            };
            parts.push(format!("- {}: {} ({})", hit.title, snippet, hit.url));
        }
        if parts.is_empty() {
            parts.push("No summary available, please refine your query.".to_string());
        }
        parts.join("\n")
    }
}

/// Trait for the web search collaborator so tests can script results.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchDigest, AppError>;
}

/// Tavily-backed implementation.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl TavilyClient {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("TAVILY_API_KEY not set; research queries will fail soft");
        }
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[async_trait]
impl WebSearchClient for TavilyClient {
    #[instrument(skip(self), fields(query_len = query.len()))]
    async fn search(&self, query: &str) -> Result<SearchDigest, AppError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::SearchFailed("TAVILY_API_KEY is not configured".to_string()))?;

        let payload = json!({
            "api_key": api_key,
            "query": query,
            "search_depth": "advanced",
            "max_results": MAX_RESULTS,
            "include_answer": true,
            "include_raw_content": false,
        });

        let response = self
            .http
            .post(TAVILY_API_URL)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::SearchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::SearchFailed(e.to_string()))?;

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::SearchFailed(format!("invalid search response: {e}")))?;

        debug!(results = body.results.len(), "Tavily search completed");
        Ok(SearchDigest {
            answer: body.answer,
            results: body.results,
        })
    }
}

#[async_trait]
impl WebSearchClient for Arc<TavilyClient> {
    async fn search(&self, query: &str) -> Result<SearchDigest, AppError> {
        (**self).search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_answer_and_top_hits() {
        let digest = SearchDigest {
            answer: Some("Perpetual usage rights never expire.".to_string()),
            results: vec![
                SearchHit {
                    title: "FTC guidance".to_string(),
                    url: "https://ftc.gov/example".to_string(),
                    content: "Disclosure rules for influencers.".to_string(),
                },
                SearchHit {
                    title: "Law blog".to_string(),
                    url: "https://example.com/blog".to_string(),
                    content: "x".repeat(300),
                },
            ],
        };
        let rendered = digest.render();
        assert!(rendered.starts_with("**Summary:** Perpetual"));
        assert!(rendered.contains("FTC guidance"));
        assert!(rendered.contains("..."));
        assert!(rendered.contains("https://ftc.gov/example"));
    }

    #[test]
    fn render_empty_digest_prompts_refinement() {
        assert_eq!(
            SearchDigest::default().render(),
            "No summary available, please refine your query."
        );
    }
}
