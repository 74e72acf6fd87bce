pub mod calendar_sync;
pub mod company_name;
pub mod email_service;
pub mod pipeline;
pub mod review_service;
pub mod web_search;

pub use calendar_sync::{
    CalendarApi, CalendarSynchronizer, DeliverableRecord, GoogleCalendarClient, SyncOutcome,
    SyncSummary,
};
pub use company_name::detect_company_name;
pub use email_service::{create_email_service, EmailService};
pub use review_service::{run_contract_review, ReviewOutcome, ReviewRequest};
pub use web_search::{TavilyClient, WebSearchClient};
