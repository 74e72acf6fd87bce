//! Mock collaborators and router helpers for the integration tests.
//!
//! Kept in the library (not `#[cfg(test)]`) so the `tests/` tree and the CLI
//! smoke tests can share one set of mocks.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use genai::adapter::AdapterKind;
use genai::chat::{ChatOptions, ChatRequest, ChatResponse, MessageContent};
use genai::ModelIden;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm::AiClient;
use crate::routes::build_router;
use crate::services::calendar_sync::{
    CalendarApi, CalendarError, CalendarEvent, EventWindow, NewCalendarEvent,
};
use crate::services::email_service::{EmailError, EmailResult, EmailService};
use crate::services::web_search::{SearchDigest, SearchHit, WebSearchClient};
use crate::state::{AppState, AppStateServices};

pub const TEST_PASSWORD: &str = "opensesame";

// --- Mock AI client ---

/// Scripted AI client: pops one canned response per call, recording every
/// request it saw.
#[derive(Clone, Default)]
pub struct MockAiClient {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    error_to_return: Arc<Mutex<Option<AppError>>>,
}

impl MockAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the given responses, first call first.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::default();
        for response in responses {
            client.push_response(response);
        }
        client
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    pub fn set_error(&self, error: AppError) {
        *self.error_to_return.lock().unwrap() = Some(error);
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn exec_chat(
        &self,
        _model_name: &str,
        request: ChatRequest,
        _config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request);

        if let Some(error) = self.error_to_return.lock().unwrap().clone() {
            return Err(error);
        }

        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Mock AI response".to_string());

        Ok(ChatResponse {
            model_iden: ModelIden::new(AdapterKind::Gemini, "gemini/mock-model"),
            content: Some(MessageContent::Text(text)),
            reasoning_content: None,
            usage: Default::default(),
        })
    }
}

// --- Mock email service ---

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct MockEmailService {
    pub sent: Arc<Mutex<Vec<SentEmail>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_send(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    pub fn sent_messages(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_report(
        &self,
        to_email: &str,
        subject: &str,
        markdown_body: &str,
    ) -> EmailResult<()> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(EmailError::SendFailed("simulated SMTP failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to_email.to_string(),
            subject: subject.to_string(),
            body: markdown_body.to_string(),
        });
        Ok(())
    }
}

// --- Mock calendar API ---

/// In-memory calendar: inserted events become visible to later list calls,
/// so idempotence tests exercise the real duplicate check.
#[derive(Clone)]
pub struct MockCalendarApi {
    events: Arc<Mutex<Vec<CalendarEvent>>>,
    pub inserted: Arc<Mutex<Vec<NewCalendarEvent>>>,
    fail_titles_containing: Arc<Mutex<Option<String>>>,
    configured: bool,
    next_id: Arc<AtomicUsize>,
}

impl Default for MockCalendarApi {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            inserted: Arc::new(Mutex::new(Vec::new())),
            fail_titles_containing: Arc::new(Mutex::new(None)),
            configured: true,
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }
}

impl MockCalendarApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// Seeds a pre-existing event.
    pub fn with_event(
        self,
        summary: impl Into<String>,
        start: DateTime<Utc>,
        idempotency_key: Option<String>,
    ) -> Self {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(CalendarEvent {
            id: format!("seeded-{id}"),
            summary: summary.into(),
            start,
            idempotency_key,
        });
        self
    }

    /// Make inserts whose title contains `fragment` fail with an API error.
    pub fn fail_inserts_containing(&self, fragment: impl Into<String>) {
        *self.fail_titles_containing.lock().unwrap() = Some(fragment.into());
    }

    pub fn inserted_events(&self) -> Vec<NewCalendarEvent> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarApi for MockCalendarApi {
    async fn list_events(
        &self,
        window: &EventWindow,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if !self.configured {
            return Err(CalendarError::NotConfigured);
        }
        let query = query.to_lowercase();
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.start >= window.time_min && e.start <= window.time_max)
            .filter(|e| query.is_empty() || e.summary.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn insert_event(
        &self,
        event: &NewCalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        if !self.configured {
            return Err(CalendarError::NotConfigured);
        }
        if let Some(fragment) = self.fail_titles_containing.lock().unwrap().as_ref() {
            if event.summary.contains(fragment.as_str()) {
                return Err(CalendarError::Api("simulated insert failure".to_string()));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = CalendarEvent {
            id: format!("event-{id}"),
            summary: event.summary.clone(),
            start: event.start.with_timezone(&Utc),
            idempotency_key: Some(event.idempotency_key.clone()),
        };
        self.events.lock().unwrap().push(created.clone());
        self.inserted.lock().unwrap().push(event.clone());
        Ok(created)
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

// --- Mock web search ---

#[derive(Clone, Default)]
pub struct MockWebSearchClient {
    pub queries: Arc<Mutex<Vec<String>>>,
    digest: Arc<Mutex<SearchDigest>>,
}

impl MockWebSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, answer: impl Into<String>) -> Self {
        *self.digest.lock().unwrap() = SearchDigest {
            answer: Some(answer.into()),
            results: vec![SearchHit {
                title: "Mock source".to_string(),
                url: "https://example.com/mock".to_string(),
                content: "Mock snippet.".to_string(),
            }],
        };
        self
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearchClient for MockWebSearchClient {
    async fn search(&self, query: &str) -> Result<SearchDigest, AppError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.digest.lock().unwrap().clone())
    }
}

// --- Router / request helpers ---

/// Test configuration: cheap bcrypt cost, short ceiling, temp artifact root.
pub fn test_config(artifact_root: &str) -> Config {
    Config {
        app_password_hash: Some(
            bcrypt::hash(TEST_PASSWORD, 4).expect("test password must hash"),
        ),
        session_cookie_secure: false,
        pipeline_ceiling_secs: 30,
        artifact_root: artifact_root.to_string(),
        ..Config::default()
    }
}

/// A fully wired test application: router plus handles to every mock.
pub struct TestApp {
    pub router: Router,
    pub ai_client: MockAiClient,
    pub email: MockEmailService,
    pub calendar: MockCalendarApi,
    pub web_search: MockWebSearchClient,
    // Held so the artifact root outlives the test.
    pub artifact_dir: tempfile::TempDir,
}

pub fn spawn_test_app() -> TestApp {
    let artifact_dir = tempfile::tempdir().expect("tempdir");
    let config = Arc::new(test_config(&artifact_dir.path().to_string_lossy()));

    let ai_client = MockAiClient::new();
    let email = MockEmailService::new();
    let calendar = MockCalendarApi::new();
    let web_search = MockWebSearchClient::new();

    let services = AppStateServices {
        ai_client: Arc::new(ai_client.clone()),
        email_service: Arc::new(email.clone()),
        calendar: Arc::new(calendar.clone()),
        web_search: Arc::new(web_search.clone()),
    };
    let router = build_router(AppState::new(config, services));

    TestApp {
        router,
        ai_client,
        email,
        calendar,
        web_search,
        artifact_dir,
    }
}

/// Logs in with the test password and returns the session cookie to attach
/// to subsequent requests.
pub async fn login(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(format!("password={TEST_PASSWORD}")))
                .expect("request"),
        )
        .await
        .expect("login request");
    assert_eq!(response.status(), StatusCode::OK, "test login must succeed");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .expect("cookie header is ascii");
    set_cookie
        .split(';')
        .next()
        .expect("cookie value")
        .to_string()
}

pub const MULTIPART_BOUNDARY: &str = "pact-test-boundary";

/// Builds a multipart/form-data body with optional contract and email parts.
pub fn multipart_upload_body(contract: Option<(&str, &str)>, user_email: Option<&str>) -> String {
    let mut body = String::new();
    if let Some((filename, content)) = contract {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"contract\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n"
        ));
    }
    if let Some(email) = user_email {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"user_email\"\r\n\r\n\
             {email}\r\n"
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    body
}

/// Convenience wrapper for an authenticated upload request.
pub fn upload_request(cookie: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}
