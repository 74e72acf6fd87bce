use std::sync::Arc;

use crate::config::Config;
use crate::llm::AiClient;
use crate::services::calendar_sync::CalendarApi;
use crate::services::email_service::EmailService;
use crate::services::web_search::WebSearchClient;

/// External collaborators, behind traits so tests can swap in mocks.
#[derive(Clone)]
pub struct AppStateServices {
    pub ai_client: Arc<dyn AiClient + Send + Sync>,
    pub email_service: Arc<dyn EmailService + Send + Sync>,
    pub calendar: Arc<dyn CalendarApi + Send + Sync>,
    pub web_search: Arc<dyn WebSearchClient + Send + Sync>,
}

// --- Shared application state ---
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: AppStateServices,
}

impl AppState {
    pub fn new(config: Arc<Config>, services: AppStateServices) -> Self {
        Self { config, services }
    }
}
