//! End-to-end contract review: heuristics, guarded pipeline run, email
//! dispatch, and (creator mode) calendar sync. Shared by the upload route
//! and the CLI so both boundaries drive exactly the same flow.

use chrono::Utc;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::ReviewMode;
use crate::services::calendar_sync::{CalendarSynchronizer, SyncSummary};
use crate::services::company_name::detect_company_name;
use crate::services::pipeline::{
    pipeline_for, run_with_ceiling, PipelineInputs, PipelineRunner, RunArtifacts,
};
use crate::state::AppState;
use std::path::PathBuf;

/// One review request, independent of the boundary it arrived through.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub mode: ReviewMode,
    pub contract_text: String,
    pub user_email: String,
}

/// What the caller reports back to the user.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub message: String,
    pub summary_path: PathBuf,
    pub calendar: Option<SyncSummary>,
}

/// Runs the full review flow for one uploaded contract.
#[instrument(skip(state, request), fields(mode = %request.mode, user_email = %request.user_email))]
pub async fn run_contract_review(
    state: &AppState,
    request: ReviewRequest,
) -> Result<ReviewOutcome, AppError> {
    let company_name = detect_company_name(&request.contract_text);
    if !company_name.is_empty() {
        info!(%company_name, "Detected counterparty organization");
    }
    let subject_line = build_subject_line(&company_name);

    let artifacts = RunArtifacts::create(&state.config.artifact_root).await?;
    let spec = pipeline_for(request.mode);
    let runner = PipelineRunner::new(
        state.services.ai_client.clone(),
        state.services.web_search.clone(),
        state.config.review_model.clone(),
    );
    let inputs = PipelineInputs {
        user_email: request.user_email.clone(),
        contract_text: request.contract_text.clone(),
    };

    let ceiling = state.config.pipeline_ceiling();
    let report = run_with_ceiling(
        async move { runner.run(&spec, &inputs, &artifacts).await },
        ceiling,
    )
    .await?;

    // The dispatcher reads the artifact file, not the in-memory output: the
    // file is the contract between the pipeline and its consumers.
    let summary_markdown = tokio::fs::read_to_string(&report.summary_path).await?;
    state
        .services
        .email_service
        .send_report(&request.user_email, &subject_line, &summary_markdown)
        .await?;

    let calendar = match request.mode {
        ReviewMode::Creator => {
            let synchronizer = CalendarSynchronizer::new(state.services.calendar.clone());
            Some(
                synchronizer
                    .sync_deliverables(&report.deliverables, &request.user_email)
                    .await,
            )
        }
        ReviewMode::Legal => None,
    };

    let mut message = format!(
        "Contract processed! Check your email ({}).",
        request.user_email
    );
    if let Some(summary) = &calendar {
        message.push(' ');
        message.push_str(&summary.line());
    }

    Ok(ReviewOutcome {
        message,
        summary_path: report.summary_path,
        calendar,
    })
}

fn build_subject_line(company_name: &str) -> String {
    let today = Utc::now().date_naive();
    if company_name.is_empty() {
        format!("Contract Summary Report {today}")
    } else {
        format!("Contract Summary Report {today} - {company_name}")
    }
}
