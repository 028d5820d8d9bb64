//! One-shot workflow: configure, ingest, analyze, show the report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use compass_core::analysis::AnalysisRequest;
use compass_core::session::ScoringConfig;
use compass_export::ReportView;
use compass_infrastructure::{env_api_key, load_uploads};

use super::applied;
use crate::app::App;
use crate::display;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// API key for the analysis service (falls back to COMPASS_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Knowledge-base documents (values, code of conduct, ...)
    #[arg(long = "kb", value_name = "FILE", num_args = 1..)]
    pub knowledge_base: Vec<PathBuf>,

    /// Candidate name
    #[arg(long)]
    pub candidate: String,

    /// Written statements, inline
    #[arg(long, conflicts_with = "statements_file")]
    pub statements: Option<String>,

    /// Written statements, read from a file
    #[arg(long, value_name = "FILE")]
    pub statements_file: Option<PathBuf>,

    /// Candidate attachments (CV, portfolio, ...)
    #[arg(long = "attach", value_name = "FILE", num_args = 1..)]
    pub attachments: Vec<PathBuf>,

    /// Penalty per critical conflict
    #[arg(long)]
    pub critical_penalty: Option<i32>,

    /// Penalty per minor conflict
    #[arg(long)]
    pub minor_penalty: Option<i32>,

    /// Also write the report as HTML
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,
}

pub async fn execute(app: &App, args: RunArgs) -> Result<()> {
    let coordinator = &app.coordinator;

    let api_key = args.api_key.or_else(env_api_key).unwrap_or_default();
    display::info("Configuring API Key...");
    applied(coordinator.configure_credential(&api_key).await)?;
    display::success("API key configured");

    let corpus = load_uploads(&args.knowledge_base)
        .await
        .context("Failed to read knowledge-base documents")?;
    display::info("Processing documents...");
    applied(coordinator.ingest_corpus(&corpus).await)?;
    display::success(&format!("Knowledge base loaded ({} document(s))", corpus.len()));

    if args.critical_penalty.is_some() || args.minor_penalty.is_some() {
        let current = coordinator.session().scoring;
        coordinator.set_scoring(ScoringConfig {
            critical_penalty: args.critical_penalty.unwrap_or(current.critical_penalty),
            minor_penalty: args.minor_penalty.unwrap_or(current.minor_penalty),
        });
    }

    let statements = match (args.statements, args.statements_file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };
    let attachments = load_uploads(&args.attachments)
        .await
        .context("Failed to read candidate attachments")?;
    let request = AnalysisRequest::new(args.candidate)
        .with_statements(statements)
        .with_attachments(attachments);

    display::info("Agents are at work...");
    applied(coordinator.submit_analysis(&request).await)?;

    let report = coordinator.session().current_report.unwrap_or_default();
    display::report(&report);
    if let Some(path) = args.html {
        ReportView::new(report).save_html(&path)?;
        display::success(&format!("Report written to {}", path.display()));
    }
    Ok(())
}
