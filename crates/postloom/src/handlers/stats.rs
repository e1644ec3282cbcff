//! Statistics commands

use super::core_error;
use crate::state::AppState;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use postloom_core::{MemoryStats, PostStats};
use sen::{CliResult, State};

/// Show post counters
///
/// Usage:
///   postloom stats
pub async fn stats(state: State<AppState>) -> CliResult<String> {
    let app = state.read().await;

    let stats = app
        .db
        .storage()
        .post_stats()
        .await
        .map_err(|e| core_error("Failed to load stats", e))?;

    Ok(render_post_stats(&stats))
}

/// Show conversation memory analytics
///
/// Usage:
///   postloom memory
pub async fn memory(state: State<AppState>) -> CliResult<String> {
    let app = state.read().await;

    let stats = app
        .db
        .storage()
        .memory_stats()
        .await
        .map_err(|e| core_error("Failed to load memory stats", e))?;

    Ok(render_memory_stats(&stats))
}

fn render_post_stats(stats: &PostStats) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Total").fg(Color::Cyan),
            Cell::new("Today").fg(Color::Cyan),
            Cell::new("Published").fg(Color::Cyan),
        ])
        .add_row(vec![
            stats.total_posts.to_string(),
            stats.today_posts.to_string(),
            stats.published_posts.to_string(),
        ]);

    format!("\n{}", table)
}

fn render_memory_stats(stats: &MemoryStats) -> String {
    let mut output = String::new();
    output.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    output.push_str("  Conversation Memory\n");
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    output.push_str(&format!("Conversations:    {}\n", stats.conversations));
    output.push_str(&format!("Messages:         {}\n", stats.messages));
    output.push_str(&format!("Active (7 days):  {}\n", stats.recent_activity));
    output.push_str(&format!("Memory items:     {}\n", stats.memory_items));

    if !stats.top_personas.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Persona").fg(Color::Cyan),
                Cell::new("Conversations").fg(Color::Cyan),
            ]);
        for persona in &stats.top_personas {
            table.add_row(vec![persona.persona.clone(), persona.count.to_string()]);
        }
        output.push_str(&format!("\nTop personas:\n{}\n", table));
    }

    output.push_str("\nInsights:\n");
    for line in stats.insights() {
        output.push_str(&format!("  • {}\n", line));
    }

    output
}
