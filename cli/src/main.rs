// cli/src/main.rs
//
// Runs the contract-review pipeline directly, without the web boundary.
// Mirrors the two server-side entry points: a file-based run and a JSON
// trigger payload (for webhooks and scripted invocations).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use pact_backend::config::Config;
use pact_backend::models::ReviewMode;
use pact_backend::services::review_service::{run_contract_review, ReviewRequest};
use pact_backend::state::AppState;
use pact_backend::state_builder::AppStateServicesBuilder;
use pact_backend::text_processing::extract_contract_text;

/// Review a contract from the command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review a contract document and email the summary.
    Run {
        /// Path to the contract (PDF or plain text)
        #[arg(short, long)]
        contract: PathBuf,
        /// Recipient email address
        #[arg(short, long)]
        email: String,
        /// Pipeline variant: legal or creator
        #[arg(short, long, default_value = "legal")]
        mode: String,
    },
    /// Review from a JSON trigger payload, e.g.
    /// '{"contract_text": "...", "user_email": "...", "mode": "creator"}'
    Trigger {
        payload: String,
    },
}

#[derive(Debug, Deserialize)]
struct TriggerPayload {
    #[serde(default)]
    contract_text: String,
    #[serde(default)]
    user_email: String,
    #[serde(default)]
    mode: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pact_cli=info,pact_backend=info".into());
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let (contract_text, user_email, mode_str) = match args.command {
        Command::Run {
            contract,
            email,
            mode,
        } => {
            let bytes = std::fs::read(&contract)
                .with_context(|| format!("failed to read {}", contract.display()))?;
            let filename = contract
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "contract".to_string());
            let text = extract_contract_text(&filename, &bytes)?;
            (text, email, mode)
        }
        Command::Trigger { payload } => {
            let payload: TriggerPayload =
                serde_json::from_str(&payload).context("invalid JSON trigger payload")?;
            anyhow::ensure!(
                !payload.contract_text.trim().is_empty()
                    && !payload.user_email.trim().is_empty(),
                "trigger payload must carry contract_text and user_email"
            );
            (
                payload.contract_text,
                payload.user_email,
                payload.mode.unwrap_or_else(|| "legal".to_string()),
            )
        }
    };

    let mode: ReviewMode = mode_str
        .parse()
        .map_err(|()| anyhow::anyhow!("unknown review mode {mode_str:?}"))?;

    let config = Arc::new(Config::load().context("failed to load configuration")?);
    let services = AppStateServicesBuilder::new(config.clone())
        .build()
        .context("failed to build services")?;
    let state = AppState::new(config, services);

    tracing::info!(%mode, %user_email, "Starting contract review");
    let outcome = run_contract_review(
        &state,
        ReviewRequest {
            mode,
            contract_text,
            user_email,
        },
    )
    .await?;

    println!("✅ Contract review completed successfully.");
    println!("📄 Summary written to {}", outcome.summary_path.display());
    println!("{}", outcome.message);
    Ok(())
}
