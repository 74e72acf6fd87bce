//! The Calendar Synchronizer's create-or-skip algorithm, duplicate
//! detection, per-record error isolation, and idempotence.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use pact_backend::services::calendar_sync::{
    idempotency_key, CalendarSynchronizer, DeliverableRecord, SyncOutcome,
};
use pact_backend::test_helpers::MockCalendarApi;

const USER_EMAIL: &str = "creator@example.com";

fn record(summary: &str, start_date: &str) -> DeliverableRecord {
    DeliverableRecord {
        summary: summary.to_string(),
        description: "One sponsored reel".to_string(),
        start_date: start_date.to_string(),
        start_time: None,
        timezone: None,
        user_email: String::new(),
    }
}

#[tokio::test]
async fn creates_an_event_anchored_at_nine_am_pacific() {
    let api = MockCalendarApi::new();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let summary = sync
        .sync_deliverables(&[record("Instagram Post", "2025-06-01")], USER_EMAIL)
        .await;

    assert_eq!(summary.created_count(), 1);
    assert_eq!(summary.exists_count(), 0);
    assert!(summary.line().contains("1 event(s) created"));

    let inserted = api.inserted_events();
    assert_eq!(inserted.len(), 1);
    let event = &inserted[0];
    assert_eq!(event.summary, "📋 Instagram Post");
    assert!(event.description.starts_with("Contract Deliverable"));
    assert_eq!(event.attendee_email, USER_EMAIL);
    assert!(event.start.to_rfc3339().starts_with("2025-06-01T09:00:00"));
    assert_eq!(
        event.end.signed_duration_since(event.start),
        chrono::Duration::hours(1)
    );
}

#[tokio::test]
async fn explicit_time_and_zone_are_honored() {
    let api = MockCalendarApi::new();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let mut rec = record("Launch Stream", "2025-06-01");
    rec.start_time = Some("18:30".to_string());
    rec.timezone = Some("America/New_York".to_string());

    sync.sync_deliverables(&[rec], USER_EMAIL).await;

    let inserted = api.inserted_events();
    assert_eq!(inserted.len(), 1);
    assert!(inserted[0]
        .start
        .to_rfc3339()
        .starts_with("2025-06-01T18:30:00-04:00"));
}

#[tokio::test]
async fn existing_marker_title_in_window_means_exists() {
    // 09:00 PDT on 2025-06-01 is 16:00 UTC.
    let existing_start = Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap();
    let api = MockCalendarApi::new().with_event("📋 Instagram Post", existing_start, None);
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let summary = sync
        .sync_deliverables(&[record("Instagram Post", "2025-06-01")], USER_EMAIL)
        .await;

    assert_eq!(summary.created_count(), 0);
    assert_eq!(summary.exists_count(), 1);
    assert!(api.inserted_events().is_empty(), "no creation call on duplicate");
}

#[tokio::test]
async fn idempotency_key_match_means_exists_even_with_renamed_title() {
    let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let key = idempotency_key("Instagram Post", date);
    let existing_start = Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap();
    // Title was edited by hand, but the recorded key still identifies it.
    let api = MockCalendarApi::new().with_event("Instagram Post (moved)", existing_start, Some(key));
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let summary = sync
        .sync_deliverables(&[record("Instagram Post", "2025-06-01")], USER_EMAIL)
        .await;

    assert_eq!(summary.exists_count(), 1);
    assert!(api.inserted_events().is_empty());
}

#[tokio::test]
async fn missing_date_or_title_is_skipped_without_network_calls() {
    let api = MockCalendarApi::new();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let undated = record("Instagram Post", "");
    let untitled = record("", "2025-06-01");
    let summary = sync.sync_deliverables(&[undated, untitled], USER_EMAIL).await;

    assert_eq!(summary.created_count(), 0);
    assert!(api.inserted_events().is_empty());
    assert!(matches!(
        &summary.outcomes[0],
        SyncOutcome::Skipped { reason, .. } if reason.contains("start_date")
    ));
    assert!(matches!(
        &summary.outcomes[1],
        SyncOutcome::Skipped { reason, .. } if reason.contains("title")
    ));
}

#[tokio::test]
async fn one_record_error_does_not_abort_the_batch() {
    let api = MockCalendarApi::new();
    api.fail_inserts_containing("Doomed");
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let summary = sync
        .sync_deliverables(
            &[
                record("Doomed Deliverable", "2025-06-01"),
                record("Healthy Deliverable", "2025-06-02"),
            ],
            USER_EMAIL,
        )
        .await;

    assert_eq!(summary.created_count(), 1);
    assert!(matches!(
        &summary.outcomes[0],
        SyncOutcome::Error { title, .. } if title == "Doomed Deliverable"
    ));
    assert!(matches!(
        &summary.outcomes[1],
        SyncOutcome::Created { title } if title == "Healthy Deliverable"
    ));
}

#[tokio::test]
async fn second_run_over_the_same_records_creates_nothing_new() {
    let api = MockCalendarApi::new();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));
    let records = vec![
        record("Instagram Post", "2025-06-01"),
        record("YouTube Video", "2025-06-15"),
    ];

    let first = sync.sync_deliverables(&records, USER_EMAIL).await;
    assert_eq!(first.created_count(), 2);

    let second = sync.sync_deliverables(&records, USER_EMAIL).await;
    assert_eq!(second.created_count(), 0);
    assert_eq!(second.exists_count(), 2);
    assert_eq!(api.inserted_events().len(), 2, "zero net new events");
}

#[tokio::test]
async fn unconfigured_calendar_degrades_to_a_reported_outcome() {
    let api = MockCalendarApi::unconfigured();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let summary = sync
        .sync_deliverables(&[record("Instagram Post", "2025-06-01")], USER_EMAIL)
        .await;

    assert!(!summary.configured);
    assert_eq!(summary.line(), "📅 Calendar sync not configured");
    assert!(api.inserted_events().is_empty());
}

#[tokio::test]
async fn record_email_overrides_the_fallback_attendee() {
    let api = MockCalendarApi::new();
    let sync = CalendarSynchronizer::new(Arc::new(api.clone()));

    let mut rec = record("Instagram Post", "2025-06-01");
    rec.user_email = "other@example.com".to_string();
    sync.sync_deliverables(&[rec], USER_EMAIL).await;

    assert_eq!(api.inserted_events()[0].attendee_email, "other@example.com");
}
