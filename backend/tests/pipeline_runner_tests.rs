//! The sequential runner: task ordering, artifact writing, fenced-output
//! cleanup, and the research round-trip.

use std::sync::Arc;

use pact_backend::errors::AppError;
use pact_backend::models::ReviewMode;
use pact_backend::services::pipeline::{
    pipeline_for, PipelineInputs, PipelineRunner, RunArtifacts,
};
use pact_backend::test_helpers::{MockAiClient, MockWebSearchClient};

fn inputs() -> PipelineInputs {
    PipelineInputs {
        user_email: "user@example.com".to_string(),
        contract_text: "This Agreement is made between Acme Co and John Doe.".to_string(),
    }
}

async fn run_artifacts() -> (tempfile::TempDir, RunArtifacts) {
    let dir = tempfile::tempdir().expect("tempdir");
    let artifacts = RunArtifacts::create(&dir.path().to_string_lossy())
        .await
        .expect("artifact dir");
    (dir, artifacts)
}

#[tokio::test]
async fn legal_pipeline_makes_one_call_per_task_and_writes_the_summary() {
    let ai = MockAiClient::scripted([
        "Clause list.",
        "Risk report.",
        "NO_RESEARCH_NEEDED",
        "# Summary\n\nPlain English.",
    ]);
    let search = MockWebSearchClient::new();
    let runner = PipelineRunner::new(
        Arc::new(ai.clone()),
        Arc::new(search.clone()),
        "mock-model".to_string(),
    );
    let (_dir, artifacts) = run_artifacts().await;

    let report = runner
        .run(&pipeline_for(ReviewMode::Legal), &inputs(), &artifacts)
        .await
        .expect("pipeline run");

    assert_eq!(ai.call_count(), 4);
    assert_eq!(report.final_output, "# Summary\n\nPlain English.");
    assert!(report.deliverables.is_empty());
    assert!(search.recorded_queries().is_empty());

    let written = tokio::fs::read_to_string(&report.summary_path)
        .await
        .expect("summary artifact");
    assert_eq!(written, "# Summary\n\nPlain English.");
}

#[tokio::test]
async fn research_directive_triggers_one_search_and_a_summary_call() {
    let ai = MockAiClient::scripted([
        "Clause list.",
        "Risk report.",
        "SEARCH: perpetual usage rights influencer contract",
        "Research findings citing https://ftc.gov/example.",
        "# Summary",
    ]);
    let search = MockWebSearchClient::new().with_answer("Perpetual rights never lapse.");
    let runner = PipelineRunner::new(
        Arc::new(ai.clone()),
        Arc::new(search.clone()),
        "mock-model".to_string(),
    );
    let (_dir, artifacts) = run_artifacts().await;

    runner
        .run(&pipeline_for(ReviewMode::Legal), &inputs(), &artifacts)
        .await
        .expect("pipeline run");

    // Decision + summarization calls for the research task.
    assert_eq!(ai.call_count(), 5);
    assert_eq!(
        search.recorded_queries(),
        vec!["perpetual usage rights influencer contract".to_string()]
    );

    // The summarization prompt carried the rendered search digest.
    let requests = ai.recorded_requests();
    let summarize_prompt = format!("{:?}", requests[3]);
    assert!(summarize_prompt.contains("Perpetual rights never lapse."));
}

#[tokio::test]
async fn creator_pipeline_parses_the_fenced_deliverables_artifact() {
    let ai = MockAiClient::scripted([
        "Clause list.",
        "Risk report.",
        "NO_RESEARCH_NEEDED",
        "```json\n[{\"summary\": \"Instagram Post\", \"start_date\": \"2025-06-01\"}]\n```",
        "## Brand Deal Summary",
    ]);
    let runner = PipelineRunner::new(
        Arc::new(ai.clone()),
        Arc::new(MockWebSearchClient::new()),
        "mock-model".to_string(),
    );
    let (_dir, artifacts) = run_artifacts().await;

    let report = runner
        .run(&pipeline_for(ReviewMode::Creator), &inputs(), &artifacts)
        .await
        .expect("pipeline run");

    assert_eq!(report.deliverables.len(), 1);
    assert_eq!(report.deliverables[0].summary, "Instagram Post");
    assert_eq!(report.deliverables[0].start_date, "2025-06-01");

    // The artifact on disk is the parsed, pretty-printed form.
    let written = tokio::fs::read_to_string(artifacts.deliverables_path())
        .await
        .expect("deliverables artifact");
    assert!(written.contains("\"summary\": \"Instagram Post\""));
}

#[tokio::test]
async fn unparseable_deliverables_artifact_is_a_pipeline_failure() {
    let ai = MockAiClient::scripted([
        "Clause list.",
        "Risk report.",
        "NO_RESEARCH_NEEDED",
        "I could not find any deliverables, sorry!",
        "## Brand Deal Summary",
    ]);
    let runner = PipelineRunner::new(
        Arc::new(ai),
        Arc::new(MockWebSearchClient::new()),
        "mock-model".to_string(),
    );
    let (_dir, artifacts) = run_artifacts().await;

    let err = runner
        .run(&pipeline_for(ReviewMode::Creator), &inputs(), &artifacts)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PipelineFailed(msg) if msg.contains("deliverables")));
}

#[tokio::test]
async fn model_errors_propagate_out_of_the_run() {
    let ai = MockAiClient::new();
    ai.set_error(AppError::LlmClientError("quota exhausted".into()));
    let runner = PipelineRunner::new(
        Arc::new(ai),
        Arc::new(MockWebSearchClient::new()),
        "mock-model".to_string(),
    );
    let (_dir, artifacts) = run_artifacts().await;

    let err = runner
        .run(&pipeline_for(ReviewMode::Legal), &inputs(), &artifacts)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LlmClientError(_)));
}
