//! History command

use super::{core_error, format_timestamp, truncate};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use postloom_core::HistoryEntry;
use sen::{Args, CliResult, State};

/// List recently generated posts
///
/// Usage:
///   postloom history
///   postloom history --limit 10
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Maximum number of posts to show
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,
}

#[sen::handler]
pub async fn history(state: State<AppState>, Args(args): Args<HistoryArgs>) -> CliResult<String> {
    let app = state.read().await;

    let entries = app
        .db
        .storage()
        .recent_posts(args.limit)
        .await
        .map_err(|e| core_error("Failed to list posts", e))?;

    if entries.is_empty() {
        return Ok("No posts found.".to_string());
    }

    Ok(format!(
        "\n{}\n\nTotal: {} posts",
        history_table(&entries),
        entries.len()
    ))
}

fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("When").fg(Color::Green),
            Cell::new("Topic").fg(Color::Green),
            Cell::new("Title").fg(Color::Green),
            Cell::new("Channel").fg(Color::Green),
            Cell::new("Link").fg(Color::Green),
            Cell::new("Upvotes").fg(Color::Green),
            Cell::new("Comments").fg(Color::Green),
        ]);

    for entry in entries {
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            truncate(&entry.topic, 30),
            truncate(&entry.title, 50),
            entry.channel.clone(),
            truncate(&entry.link, 60),
            entry.upvotes.to_string(),
            entry.comments.to_string(),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_table() {
        let table = history_table(&[HistoryEntry {
            topic: "Tea".to_string(),
            title: "Tea time".to_string(),
            channel: "tea".to_string(),
            link: "[Skipped]".to_string(),
            upvotes: 4,
            comments: 2,
            timestamp: 0,
        }])
        .to_string();

        assert!(table.contains("Tea time"));
        assert!(table.contains("[Skipped]"));
        assert!(table.contains("1970-01-01 00:00 UTC"));
    }
}
