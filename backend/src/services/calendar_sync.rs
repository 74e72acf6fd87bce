//! Idempotent materialization of contract deliverables as calendar events.
//!
//! The creator pipeline produces a JSON artifact of dated deliverables; this
//! service turns each record into a Google Calendar invitation, skipping
//! records it has already materialized. Duplicate identity is an explicit
//! idempotency key (hash of normalized title + date) stored in the event's
//! private extended properties, with a title-marker fallback for events that
//! predate keying. One record's failure never aborts the rest of the batch.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::errors::AppError;

const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;
const EVENT_TITLE_MARKER: &str = "📋";
const EVENT_KEY_PROPERTY: &str = "pact_deliverable_key";
const GOOGLE_CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// How much of the title is handed to the search endpoint's `q` filter.
const SEARCH_QUERY_CHARS: usize = 24;

/// A dated obligation extracted from the contract by the creator pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableRecord {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub user_email: String,
}

#[derive(Error, Debug, Clone)]
pub enum CalendarError {
    #[error("Google Calendar is not configured")]
    NotConfigured,
    #[error("Calendar authentication failed: {0}")]
    Auth(String),
    #[error("Calendar request failed: {0}")]
    Transport(String),
    #[error("Calendar API error: {0}")]
    Api(String),
}

/// Search window handed to the events listing, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

/// An event already present on the calendar.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

/// An event to be created.
#[derive(Debug, Clone)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub attendee_email: String,
    pub idempotency_key: String,
}

/// External calendar collaborator: list events in a window, create one.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(
        &self,
        window: &EventWindow,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    async fn insert_event(&self, event: &NewCalendarEvent)
        -> Result<CalendarEvent, CalendarError>;

    /// False when no credentials were supplied; sync degrades to a reported
    /// "not configured" outcome instead of failing the run.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Stable duplicate-detection key: hash of the normalized title plus date.
pub fn idempotency_key(summary: &str, date: NaiveDate) -> String {
    let normalized = summary.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"|");
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Per-record result of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created { title: String },
    Exists { title: String },
    Skipped { title: String, reason: String },
    Error { title: String, message: String },
}

/// Aggregate of one sync pass over a deliverable set.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub outcomes: Vec<SyncOutcome>,
    pub configured: bool,
}

impl SyncSummary {
    pub fn not_configured() -> Self {
        Self {
            outcomes: Vec::new(),
            configured: false,
        }
    }

    pub fn created_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Created { .. }))
            .count()
    }

    pub fn exists_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Exists { .. }))
            .count()
    }

    /// One human-readable line for the upload response / CLI output.
    pub fn line(&self) -> String {
        if !self.configured {
            return "📅 Calendar sync not configured".to_string();
        }
        format!(
            "📅 Calendar: {} event(s) created, {} already existed",
            self.created_count(),
            self.exists_count()
        )
    }
}

/// Drives the per-record create-or-skip algorithm against a [`CalendarApi`].
pub struct CalendarSynchronizer {
    api: Arc<dyn CalendarApi + Send + Sync>,
}

impl CalendarSynchronizer {
    pub fn new(api: Arc<dyn CalendarApi + Send + Sync>) -> Self {
        Self { api }
    }

    /// Materializes each deliverable as a calendar invitation, or records why
    /// it was skipped. Never fails as a whole: transport errors are folded
    /// into per-record outcomes.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub async fn sync_deliverables(
        &self,
        records: &[DeliverableRecord],
        fallback_email: &str,
    ) -> SyncSummary {
        if !self.api.is_configured() {
            info!("Calendar sync skipped: no calendar credentials configured");
            return SyncSummary::not_configured();
        }

        let mut summary = SyncSummary {
            outcomes: Vec::with_capacity(records.len()),
            configured: true,
        };

        for record in records {
            let outcome = self.sync_one(record, fallback_email).await;
            match &outcome {
                SyncOutcome::Created { title } => info!(%title, "Calendar event created"),
                SyncOutcome::Exists { title } => debug!(%title, "Duplicate event skipped"),
                SyncOutcome::Skipped { title, reason } => {
                    warn!(%title, %reason, "Deliverable skipped")
                }
                SyncOutcome::Error { title, message } => {
                    warn!(%title, %message, "Calendar event creation failed")
                }
            }
            summary.outcomes.push(outcome);
        }

        info!(
            created = summary.created_count(),
            existing = summary.exists_count(),
            "Calendar sync pass complete"
        );
        summary
    }

    async fn sync_one(&self, record: &DeliverableRecord, fallback_email: &str) -> SyncOutcome {
        let title = record.summary.trim().to_string();

        // Required-field validation happens before any network call.
        if title.is_empty() {
            return SyncOutcome::Skipped {
                title: "(untitled)".to_string(),
                reason: "missing deliverable title".to_string(),
            };
        }
        let date = match NaiveDate::parse_from_str(record.start_date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                return SyncOutcome::Skipped {
                    title,
                    reason: format!("missing or unparseable start_date {:?}", record.start_date),
                }
            }
        };

        // Anchor at 09:00 in the reference zone unless the record carries an
        // explicit time and zone.
        let tz: Tz = record
            .timezone
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or(DEFAULT_TIMEZONE);
        let time = record
            .start_time
            .as_deref()
            .and_then(parse_event_time)
            .unwrap_or_else(default_event_time);
        let Some(start) = tz.from_local_datetime(&date.and_time(time)).earliest() else {
            return SyncOutcome::Skipped {
                title,
                reason: format!("start time does not exist in timezone {}", tz.name()),
            };
        };
        let end = start + Duration::hours(1);

        let window = EventWindow {
            time_min: (start - Duration::days(1)).with_timezone(&Utc),
            time_max: (start + Duration::days(2)).with_timezone(&Utc),
        };
        let query: String = title.chars().take(SEARCH_QUERY_CHARS).collect();
        let key = idempotency_key(&title, date);

        let existing = match self.api.list_events(&window, &query).await {
            Ok(events) => events,
            Err(e) => {
                return SyncOutcome::Error {
                    title,
                    message: e.to_string(),
                }
            }
        };

        let marker = format!("{EVENT_TITLE_MARKER} {title}").to_lowercase();
        let duplicate = existing.iter().any(|event| {
            event.idempotency_key.as_deref() == Some(key.as_str())
                || event.summary.to_lowercase().contains(&marker)
        });
        if duplicate {
            return SyncOutcome::Exists { title };
        }

        let attendee = if record.user_email.trim().is_empty() {
            fallback_email.to_string()
        } else {
            record.user_email.trim().to_string()
        };
        let new_event = NewCalendarEvent {
            summary: format!("{EVENT_TITLE_MARKER} {title}"),
            description: format!("Contract Deliverable\n\n{}", record.description),
            start,
            end,
            attendee_email: attendee,
            idempotency_key: key,
        };

        match self.api.insert_event(&new_event).await {
            Ok(_) => SyncOutcome::Created { title },
            Err(e) => SyncOutcome::Error {
                title,
                message: e.to_string(),
            },
        }
    }
}

fn parse_event_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn default_event_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time of day")
}

// --- Google Calendar v3 client ---

/// OAuth2 token blob supplied via GOOGLE_CALENDAR_TOKEN_JSON.
#[derive(Debug, Clone, Deserialize)]
struct StoredToken {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

struct CachedAccessToken {
    token: String,
    expires_at: std::time::Instant,
}

/// Google Calendar implementation of [`CalendarApi`]. Refreshes the access
/// token with the refresh-token grant when the cached one is stale.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    token: Option<StoredToken>,
    access: tokio::sync::Mutex<Option<CachedAccessToken>>,
}

impl GoogleCalendarClient {
    /// Builds the client from the raw token blob. An absent or malformed
    /// blob yields an unconfigured client rather than an error.
    pub fn from_token_blob(blob: Option<String>) -> Self {
        let token = blob.and_then(|raw| match serde_json::from_str::<StoredToken>(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "GOOGLE_CALENDAR_TOKEN_JSON is not valid token JSON; calendar sync disabled");
                None
            }
        });
        Self {
            http: reqwest::Client::new(),
            token,
            access: tokio::sync::Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let token = self.token.as_ref().ok_or(CalendarError::NotConfigured)?;

        let mut cached = self.access.lock().await;
        if let Some(access) = cached.as_ref() {
            if access.expires_at > std::time::Instant::now() {
                return Ok(access.token.clone());
            }
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            #[serde(default)]
            expires_in: Option<u64>,
        }

        let response = self
            .http
            .post(&token.token_uri)
            .form(&[
                ("client_id", token.client_id.as_str()),
                ("client_secret", token.client_secret.as_str()),
                ("refresh_token", token.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!(
                "token refresh failed with {status}: {body}"
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::Auth(format!("invalid token response: {e}")))?;

        debug!("Google Calendar access token refreshed");
        // Renew one minute before the advertised expiry.
        let ttl = refreshed.expires_in.unwrap_or(3600).saturating_sub(60);
        let access = CachedAccessToken {
            token: refreshed.access_token.clone(),
            expires_at: std::time::Instant::now() + std::time::Duration::from_secs(ttl),
        };
        *cached = Some(access);
        Ok(refreshed.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct ApiEventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: String,
    start: Option<ApiEventTime>,
    #[serde(rename = "extendedProperties")]
    extended_properties: Option<ApiExtendedProperties>,
}

#[derive(Debug, Deserialize)]
struct ApiEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ApiExtendedProperties {
    #[serde(default)]
    private: std::collections::HashMap<String, String>,
}

impl ApiEvent {
    fn into_calendar_event(self) -> Option<CalendarEvent> {
        let start = self.start.as_ref().and_then(|s| {
            s.date_time.or_else(|| {
                s.date
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
        })?;
        let idempotency_key = self
            .extended_properties
            .and_then(|p| p.private.get(EVENT_KEY_PROPERTY).cloned());
        Some(CalendarEvent {
            id: self.id,
            summary: self.summary,
            start,
            idempotency_key,
        })
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    #[instrument(skip(self))]
    async fn list_events(
        &self,
        window: &EventWindow,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let access_token = self.access_token().await?;
        let url = format!("{GOOGLE_CALENDAR_BASE}/calendars/primary/events");

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.time_min.to_rfc3339()),
                ("timeMax", window.time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", "50".to_string()),
                ("q", query.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api(format!("event list failed with {status}: {body}")));
        }

        let list: ApiEventList = response
            .json()
            .await
            .map_err(|e| CalendarError::Api(format!("invalid event list response: {e}")))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(ApiEvent::into_calendar_event)
            .collect())
    }

    #[instrument(skip(self, event), fields(summary = %event.summary))]
    async fn insert_event(
        &self,
        event: &NewCalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let access_token = self.access_token().await?;
        let url = format!("{GOOGLE_CALENDAR_BASE}/calendars/primary/events");
        let timezone = event.start.timezone().name();

        let body = json!({
            "summary": event.summary,
            "description": event.description,
            "start": {
                "dateTime": event.start.to_rfc3339(),
                "timeZone": timezone,
            },
            "end": {
                "dateTime": event.end.to_rfc3339(),
                "timeZone": timezone,
            },
            "attendees": [{"email": event.attendee_email}],
            "reminders": {"useDefault": true},
            "extendedProperties": {
                "private": {EVENT_KEY_PROPERTY: event.idempotency_key}
            },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            // sendUpdates=all delivers the invitation to the attendee.
            .query(&[("sendUpdates", "all")])
            .json(&body)
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api(format!(
                "event insert failed with {status}: {body}"
            )));
        }

        let created: ApiEvent = response
            .json()
            .await
            .map_err(|e| CalendarError::Api(format!("invalid event insert response: {e}")))?;

        created
            .into_calendar_event()
            .ok_or_else(|| CalendarError::Api("created event missing start time".to_string()))
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

/// Parses the deliverables artifact produced by the creator pipeline. The
/// model is asked for a bare JSON array but occasionally nests it under a
/// `deliverables` key; both shapes are accepted.
pub fn parse_deliverables(json_text: &str) -> Result<Vec<DeliverableRecord>, AppError> {
    #[derive(Deserialize)]
    struct Wrapped {
        deliverables: Vec<DeliverableRecord>,
    }

    serde_json::from_str::<Vec<DeliverableRecord>>(json_text)
        .or_else(|_| serde_json::from_str::<Wrapped>(json_text).map(|w| w.deliverables))
        .map_err(|e| {
            AppError::PipelineFailed(format!("deliverables artifact is not valid JSON: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_normalizes_title() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            idempotency_key("Instagram   Post", date),
            idempotency_key("instagram post", date)
        );
        assert_ne!(
            idempotency_key("Instagram Post", date),
            idempotency_key("Instagram Post", NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
        );
    }

    #[test]
    fn parse_deliverables_accepts_bare_array_and_wrapper() {
        let bare = r#"[{"summary": "Post", "start_date": "2025-06-01"}]"#;
        let wrapped = r#"{"deliverables": [{"summary": "Post", "start_date": "2025-06-01"}]}"#;
        assert_eq!(parse_deliverables(bare).unwrap().len(), 1);
        assert_eq!(parse_deliverables(wrapped).unwrap().len(), 1);
        assert!(parse_deliverables("not json").is_err());
    }

    #[test]
    fn event_time_parsing() {
        assert_eq!(
            parse_event_time("14:30"),
            NaiveTime::from_hms_opt(14, 30, 0)
        );
        assert_eq!(
            parse_event_time("14:30:15"),
            NaiveTime::from_hms_opt(14, 30, 15)
        );
        assert_eq!(parse_event_time("2pm"), None);
    }

    #[test]
    fn unconfigured_client_reports_itself() {
        let client = GoogleCalendarClient::from_token_blob(None);
        assert!(!client.is_configured());
        let client = GoogleCalendarClient::from_token_blob(Some("not json".to_string()));
        assert!(!client.is_configured());
    }
}
