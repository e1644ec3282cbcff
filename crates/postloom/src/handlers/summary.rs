//! Summary export command

use super::core_error;
use crate::state::AppState;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use postloom_core::{export_summary, SummaryFormat};
use sen::{Args, CliError, CliResult, State};
use std::path::PathBuf;

/// Export a daily summary
///
/// Usage:
///   postloom summary
///   postloom summary --format csv --output posts.csv
///   postloom summary --date 2025-01-31
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Output format (txt or csv)
    #[arg(short, long, default_value = "txt")]
    pub format: String,

    /// Day to summarize (YYYY-MM-DD, UTC). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Write to this file instead of printing
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[sen::handler]
pub async fn summary(state: State<AppState>, Args(args): Args<SummaryArgs>) -> CliResult<String> {
    let format: SummaryFormat = args
        .format
        .parse()
        .map_err(|e| core_error("Invalid format", e))?;
    let date = parse_date(args.date.as_deref())?;

    let app = state.read().await;
    let content = export_summary(&app.db.storage(), format, date)
        .await
        .map_err(|e| core_error("Failed to export summary", e))?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &content)
                .await
                .map_err(|e| CliError::system(format!("Failed to write {}: {}", path.display(), e)))?;
            Ok(format!("✓ Saved summary to {}", path.display()))
        }
        None => Ok(content),
    }
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate, CliError> {
    match date {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| CliError::user(format!("Invalid date: {} (expected YYYY-MM-DD)", value))),
        None => Ok(Utc::now().date_naive()),
    }
}
