use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm::{build_gemini_client, AiClient};
use crate::services::calendar_sync::{CalendarApi, GoogleCalendarClient};
use crate::services::email_service::{create_email_service, EmailService};
use crate::services::web_search::{TavilyClient, WebSearchClient};
use crate::state::AppStateServices;

/// Builder for creating AppStateServices with production defaults and
/// optional per-service overrides (the overrides are what the tests use).
pub struct AppStateServicesBuilder {
    config: Arc<Config>,

    ai_client: Option<Arc<dyn AiClient + Send + Sync>>,
    email_service: Option<Arc<dyn EmailService + Send + Sync>>,
    calendar: Option<Arc<dyn CalendarApi + Send + Sync>>,
    web_search: Option<Arc<dyn WebSearchClient + Send + Sync>>,
}

impl AppStateServicesBuilder {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            ai_client: None,
            email_service: None,
            calendar: None,
            web_search: None,
        }
    }

    pub fn with_ai_client(mut self, client: Arc<dyn AiClient + Send + Sync>) -> Self {
        self.ai_client = Some(client);
        self
    }

    pub fn with_email_service(mut self, service: Arc<dyn EmailService + Send + Sync>) -> Self {
        self.email_service = Some(service);
        self
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarApi + Send + Sync>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_web_search(mut self, client: Arc<dyn WebSearchClient + Send + Sync>) -> Self {
        self.web_search = Some(client);
        self
    }

    /// Fills every unset service with its production implementation.
    pub fn build(self) -> Result<AppStateServices, AppError> {
        let ai_client: Arc<dyn AiClient + Send + Sync> = match self.ai_client {
            Some(client) => client,
            None => build_gemini_client()?,
        };

        let email_service = match self.email_service {
            Some(service) => service,
            None => create_email_service(&self.config)?,
        };

        let calendar = self.calendar.unwrap_or_else(|| {
            Arc::new(GoogleCalendarClient::from_token_blob(
                self.config.google_calendar_token_json.clone(),
            ))
        });

        let web_search = self.web_search.unwrap_or_else(|| {
            Arc::new(TavilyClient::new(self.config.tavily_api_key.clone()))
        });

        Ok(AppStateServices {
            ai_client,
            email_service,
            calendar,
            web_search,
        })
    }
}
