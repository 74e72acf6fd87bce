//! Sequential pipeline executor.
//!
//! One model call per task, in declared order, each task seeing the outputs
//! of the tasks before it. The step-by-step reasoning belongs to the model;
//! this runner owns only the deterministic scaffolding: ordering, input
//! substitution, the research tool round-trip, and artifact writing.

use genai::chat::{ChatMessage, ChatRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::artifacts::RunArtifacts;
use super::tasks::{ArtifactKind, PipelineInputs, PipelineSpec, TaskSpec};
use crate::errors::AppError;
use crate::llm::AiClient;
use crate::services::calendar_sync::{parse_deliverables, DeliverableRecord};
use crate::services::web_search::WebSearchClient;
use crate::text_processing::strip_code_fence;

/// Reply marker the research task uses to request one web search.
const SEARCH_DIRECTIVE: &str = "SEARCH:";
/// Reply marker for declining to research.
const NO_RESEARCH_MARKER: &str = "NO_RESEARCH_NEEDED";

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Output of the final task (the user-facing summary).
    pub final_output: String,
    pub summary_path: PathBuf,
    /// Parsed deliverables artifact; empty for the legal pipeline.
    pub deliverables: Vec<DeliverableRecord>,
}

pub struct PipelineRunner {
    ai_client: Arc<dyn AiClient + Send + Sync>,
    web_search: Arc<dyn WebSearchClient + Send + Sync>,
    model: String,
}

impl PipelineRunner {
    pub fn new(
        ai_client: Arc<dyn AiClient + Send + Sync>,
        web_search: Arc<dyn WebSearchClient + Send + Sync>,
        model: String,
    ) -> Self {
        Self {
            ai_client,
            web_search,
            model,
        }
    }

    /// Runs every task of `spec` in order, writing declared artifacts into
    /// the run directory.
    #[instrument(skip(self, spec, inputs, artifacts), fields(pipeline = spec.name, run_id = %artifacts.run_id))]
    pub async fn run(
        &self,
        spec: &PipelineSpec,
        inputs: &PipelineInputs,
        artifacts: &RunArtifacts,
    ) -> Result<PipelineReport, AppError> {
        let mut completed: Vec<(&'static str, String)> = Vec::with_capacity(spec.tasks.len());
        let mut deliverables = Vec::new();

        for task in &spec.tasks {
            info!(task = task.name, "Running pipeline task");
            let output = if task.uses_search {
                self.run_research_task(task, inputs, &completed).await?
            } else {
                self.run_plain_task(task, inputs, &completed).await?
            };

            match task.artifact {
                Some(ArtifactKind::Summary) => {
                    tokio::fs::write(artifacts.summary_path(), &output).await?;
                    debug!(path = %artifacts.summary_path().display(), "Summary artifact written");
                }
                Some(ArtifactKind::Deliverables) => {
                    let records = parse_deliverables(&strip_code_fence(&output))?;
                    tokio::fs::write(
                        artifacts.deliverables_path(),
                        serde_json::to_string_pretty(&records)?,
                    )
                    .await?;
                    debug!(
                        count = records.len(),
                        path = %artifacts.deliverables_path().display(),
                        "Deliverables artifact written"
                    );
                    deliverables = records;
                }
                None => {}
            }

            completed.push((task.name, output));
        }

        let final_output = completed
            .last()
            .map(|(_, output)| output.clone())
            .unwrap_or_default();

        Ok(PipelineReport {
            final_output,
            summary_path: artifacts.summary_path(),
            deliverables,
        })
    }

    async fn run_plain_task(
        &self,
        task: &TaskSpec,
        inputs: &PipelineInputs,
        completed: &[(&'static str, String)],
    ) -> Result<String, AppError> {
        let prompt = build_user_prompt(task, inputs, completed);
        self.exec(task, prompt).await
    }

    /// The research step is a bounded tool round-trip: one call to decide on
    /// a query, one web search, one call to summarize the findings. A failed
    /// search degrades to its error text rather than failing the pipeline,
    /// matching the fail-soft behavior of the search tool it replaces.
    async fn run_research_task(
        &self,
        task: &TaskSpec,
        inputs: &PipelineInputs,
        completed: &[(&'static str, String)],
    ) -> Result<String, AppError> {
        let mut prompt = build_user_prompt(task, inputs, completed);
        prompt.push_str(
            "\n\nIf web research would help, reply with exactly one line starting with \
             `SEARCH: <query>`. If no research is needed, reply with exactly \
             `NO_RESEARCH_NEEDED`.",
        );
        let decision = self.exec(task, prompt).await?;

        if decision.contains(NO_RESEARCH_MARKER) {
            return Ok("No research needed.".to_string());
        }

        let Some(query) = decision
            .lines()
            .find_map(|line| line.trim().trim_start_matches('`').strip_prefix(SEARCH_DIRECTIVE))
            .map(|q| q.trim().trim_end_matches('`').to_string())
        else {
            // The model answered directly instead of following the protocol;
            // its answer is the research output.
            return Ok(decision);
        };

        debug!(%query, "Research task requested a web search");
        let findings = match self.web_search.search(&query).await {
            Ok(digest) => digest.render(),
            Err(e) => {
                warn!(error = %e, "Web search failed; continuing with error text");
                format!("Web search failed: {e}")
            }
        };

        let summarize_prompt = format!(
            "Search results for `{query}`:\n{findings}\n\nSummarize the findings that are \
             relevant to this contract review and cite at least one source URL."
        );
        self.exec(task, summarize_prompt).await
    }

    async fn exec(&self, task: &TaskSpec, prompt: String) -> Result<String, AppError> {
        let request =
            ChatRequest::new(vec![ChatMessage::user(prompt)]).with_system(task.agent.system_prompt());

        let response = self.ai_client.exec_chat(&self.model, request, None).await?;
        let content = response
            .content_text_as_str()
            .ok_or_else(|| {
                AppError::PipelineFailed(format!(
                    "task `{}` produced no text content",
                    task.name
                ))
            })?
            .to_string();
        Ok(content)
    }
}

fn build_user_prompt(
    task: &TaskSpec,
    inputs: &PipelineInputs,
    completed: &[(&'static str, String)],
) -> String {
    let mut prompt = task.render_description(inputs);

    if !completed.is_empty() {
        prompt.push_str("\n\n---\nContext from earlier steps:\n");
        for (name, output) in completed {
            prompt.push_str(&format!("\n### Output of `{name}`\n{output}\n"));
        }
    }

    prompt.push_str("\n\nExpected output:\n");
    prompt.push_str(task.expected_output);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewMode;
    use crate::services::pipeline::tasks::pipeline_for;

    #[test]
    fn user_prompt_threads_prior_outputs() {
        let spec = pipeline_for(ReviewMode::Legal);
        let inputs = PipelineInputs {
            user_email: "user@example.com".to_string(),
            contract_text: "text".to_string(),
        };
        let completed = vec![("parse_contract", "clause list".to_string())];
        let prompt = build_user_prompt(&spec.tasks[1], &inputs, &completed);
        assert!(prompt.contains("Output of `parse_contract`"));
        assert!(prompt.contains("clause list"));
        assert!(prompt.contains("Expected output:"));
    }
}
