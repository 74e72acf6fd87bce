//! Ordered task definitions for the two pipeline variants, plus the input
//! substitution that renders their templates.

use super::agents::{self, AgentSpec};
use crate::models::ReviewMode;

/// Named artifact a task writes into the run directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The markdown report consumed by the Notification Dispatcher.
    Summary,
    /// The JSON deliverables array consumed by the Calendar Synchronizer.
    Deliverables,
}

/// One ordered step of a pipeline.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static str,
    /// Template with `{user_email}` / `{contract_text}` placeholders.
    pub description: &'static str,
    pub expected_output: &'static str,
    pub agent: AgentSpec,
    pub artifact: Option<ArtifactKind>,
    /// Marks the research step, which may consult the web search service.
    pub uses_search: bool,
}

/// A named, ordered task list.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub name: &'static str,
    pub tasks: Vec<TaskSpec>,
}

/// Variables substituted into task description templates.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub user_email: String,
    pub contract_text: String,
}

impl TaskSpec {
    /// Renders the description template with the run's inputs.
    pub fn render_description(&self, inputs: &PipelineInputs) -> String {
        self.description
            .replace("{user_email}", &inputs.user_email)
            .replace("{contract_text}", &inputs.contract_text)
    }
}

/// Selects the task list for the session's review mode. Pure configuration:
/// the variants share no state beyond the artifacts they write.
pub fn pipeline_for(mode: ReviewMode) -> PipelineSpec {
    match mode {
        ReviewMode::Legal => legal_pipeline(),
        ReviewMode::Creator => creator_pipeline(),
    }
}

fn legal_pipeline() -> PipelineSpec {
    PipelineSpec {
        name: "legal",
        tasks: vec![
            TaskSpec {
                name: "parse_contract",
                description: "Analyze the following contract for the user {user_email}.\n\n\
                    Contract text:\n{contract_text}\n\n\
                    1. Identify and label key clauses like confidentiality, termination, payment, \
                    and liability.\n\
                    2. If a company name or organization name is present (e.g. 'This agreement is \
                    between X and Y'), extract the main company name and report it as \
                    `company_name`. If no company name is present, use an empty string.\n\
                    3. Return structured text containing the clauses, short summaries, and \
                    `company_name`.",
                expected_output: "A structured list of contract clauses with labels and short \
                    summaries for each section, plus a `company_name` field containing the main \
                    company mentioned.",
                agent: agents::CONTRACT_PARSER,
                artifact: None,
                uses_search: false,
            },
            TaskSpec {
                name: "analyze_risks",
                description: "Review the parsed clauses and assess each for potential risks, \
                    unfair terms, or ambiguity.",
                expected_output: "A risk report listing each clause, its risk level \
                    (Low/Medium/High), and explanations.",
                agent: agents::RISK_ANALYZER,
                artifact: None,
                uses_search: false,
            },
            TaskSpec {
                name: "research_clarifications",
                description: "Search the internet for definitions, precedents, or explanations \
                    about unclear terms, and summarize findings with at least one credible \
                    source. ONLY research if the contract has unclear perpetual rights or \
                    unusual clauses. Otherwise: 'No research needed'.",
                expected_output: "Brief research with one or more source links, or 'No research \
                    needed'.",
                agent: agents::LEGAL_RESEARCHER,
                artifact: None,
                uses_search: true,
            },
            TaskSpec {
                name: "summarize_for_user",
                description: "Summarize the analysis for the user in plain English. Include \
                    risks, key terms, and disclaimers that this is not legal advice.",
                expected_output: "A markdown-formatted report containing:\n\
                    - A summary of the contract\n\
                    - A list of flagged clauses and risks\n\
                    - Any important dates or actions they should be aware of to avoid or take\n\
                    - Plain-English explanations\n\
                    - A disclaimer at the end",
                agent: agents::USER_ADVOCATE,
                artifact: Some(ArtifactKind::Summary),
                uses_search: false,
            },
        ],
    }
}

fn creator_pipeline() -> PipelineSpec {
    PipelineSpec {
        name: "creator",
        tasks: vec![
            TaskSpec {
                name: "parse_contract",
                description: "Analyze the following brand-deal contract for the user \
                    {user_email}.\n\n\
                    Do NOT fabricate or infer information that is not explicitly stated in the \
                    contract text. If a section or detail is missing, leave it empty or omit it.\n\n\
                    Contract text:\n{contract_text}\n\n\
                    Required actions:\n\
                    1) Identify and label key sections and clauses only if they are in the text, \
                    focusing on: deliverables (format, platform, quantity), due dates and \
                    scheduling, payment terms, ownership & licensing, exclusivity or non-compete \
                    or whitelist requirements, royalties, usage rights, approval process, \
                    termination and penalties, confidentiality, indemnity and liability, and \
                    reporting or acceptance criteria.\n\
                    2) Extract and normalize all dates (ISO 8601) and associate each with a \
                    deliverable or obligation.\n\
                    3) Extract the primary company or brand name as `company_name` if available.\n\
                    4) Produce structured output containing `deliverables`, `dates`, \
                    `legal_flags`, `clauses`, `company_name`, and `plain_english_summary`.",
                expected_output: "Structured output with `deliverables`, `dates`, `legal_flags`, \
                    `clauses`, `company_name`, and `plain_english_summary`, omitting or leaving \
                    empty whatever is not in the text. Dates must have an associated deliverable.",
                agent: agents::BRAND_DEAL_PARSER,
                artifact: None,
                uses_search: false,
            },
            TaskSpec {
                name: "analyze_risks",
                description: "Examine the structured contract clauses produced by the previous \
                    step. Do not make up information that is not within the contract text. For \
                    each clause assess risks to the creator such as ownership and usage rights, \
                    exclusivity, approval and revision terms, vague or delayed compensation, and \
                    termination or liability clauses unfairly favoring the brand. Rate each \
                    clause Low, Medium, or High risk and explain why.",
                expected_output: "A report listing each clause with `clause_title`, `risk_level`, \
                    `risk_reason`, and an optional `recommendation` for the creator.",
                agent: agents::BRAND_DEAL_RISK_ANALYZER,
                artifact: None,
                uses_search: false,
            },
            TaskSpec {
                name: "research_clarifications",
                description: "Search the internet for definitions or real-world context for any \
                    unclear or risky terms in the influencer-brand contract, particularly content \
                    ownership and usage rights, exclusivity restrictions, royalties or revenue \
                    sharing, FTC disclosure and advertising compliance, and creator compensation \
                    norms. Summarize findings clearly and cite at least one credible, recent \
                    source.",
                expected_output: "A paragraph or short list summarizing findings with one or more \
                    cited, credible sources.",
                agent: agents::CREATOR_RESEARCHER,
                artifact: None,
                uses_search: true,
            },
            TaskSpec {
                name: "extract_deliverables",
                description: "From the parsed contract, extract every deliverable that has an \
                    associated due date for the user {user_email}. Do not invent deliverables or \
                    dates that are not in the contract. For each one produce an object with \
                    `summary` (short deliverable title), `description` (what must be produced), \
                    `start_date` (YYYY-MM-DD), optional `start_time` (HH:MM, 24h) and `timezone` \
                    (IANA name) when the contract states them, and `user_email`. Output ONLY a \
                    JSON array of these objects with no commentary.",
                expected_output: "A JSON array of deliverable records, empty if the contract \
                    contains no dated deliverables.",
                agent: agents::BRAND_DEAL_PARSER,
                artifact: Some(ArtifactKind::Deliverables),
                uses_search: false,
            },
            TaskSpec {
                name: "summarize_for_user",
                description: "Using the parsed contract clauses and risk analysis, write a \
                    concise, friendly summary for the creator who received this brand deal. Do \
                    not make up information that is not within the contract text. Include, when \
                    available: a short overview of the partnership, the deliverables with their \
                    deadlines, payment or compensation terms, key legal or business risks \
                    (content ownership, exclusivity, whitelisting, royalties, FTC disclosure), \
                    and actionable plain-English recommendations. End with a clear disclaimer \
                    that this is not legal advice.",
                expected_output: "A markdown-formatted report with the structure:\n\
                    ## Brand Deal Summary\n\
                    ## Deliverables & Deadlines\n\
                    ## Payment Terms\n\
                    ## Legal & Risk Concerns\n\
                    ## Actionable Tips for the Creator\n\
                    ### Disclaimer: This summary is for informational purposes only and not \
                    legal advice.",
                agent: agents::CREATOR_ADVOCATE,
                artifact: Some(ArtifactKind::Summary),
                uses_search: false,
            },
        ],
    }
}
