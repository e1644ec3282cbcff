//! Conversation commands

use super::{core_error, format_timestamp, truncate};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use postloom_core::{Conversation, Message, Role};
use sen::{Args, CliError, CliResult, State};

/// List recent conversations
///
/// Usage:
///   postloom conversations
///   postloom conversations --limit 5
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Maximum number of conversations to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
}

/// Show the messages of one conversation
///
/// Usage:
///   postloom show 3f1c9a2e-...
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Conversation ID
    pub id: String,

    /// Maximum number of messages to show
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,
}

#[sen::handler]
pub async fn list(state: State<AppState>, Args(args): Args<ListArgs>) -> CliResult<String> {
    let app = state.read().await;

    let conversations = app
        .db
        .storage()
        .recent_conversations(args.limit)
        .await
        .map_err(|e| core_error("Failed to list conversations", e))?;

    if conversations.is_empty() {
        return Ok("No conversations found.".to_string());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Green),
            Cell::new("Title").fg(Color::Green),
            Cell::new("Persona").fg(Color::Green),
            Cell::new("Tone").fg(Color::Green),
            Cell::new("Updated").fg(Color::Green),
        ]);

    for conversation in &conversations {
        table.add_row(vec![
            conversation.id.clone(),
            truncate(&conversation.title, 40),
            truncate(&conversation.persona, 30),
            conversation.tone.clone(),
            format_timestamp(conversation.updated_at),
        ]);
    }

    Ok(format!(
        "\n{}\n\nTotal: {} conversations",
        table,
        conversations.len()
    ))
}

#[sen::handler]
pub async fn show(state: State<AppState>, Args(args): Args<ShowArgs>) -> CliResult<String> {
    let app = state.read().await;
    let storage = app.db.storage();

    let conversation = storage
        .get_conversation(&args.id)
        .await
        .map_err(|e| core_error("Database error", e))?
        .ok_or_else(|| CliError::user(format!("Conversation not found: {}", args.id)))?;

    let messages = storage
        .conversation_history(&args.id, args.limit)
        .await
        .map_err(|e| core_error("Failed to load messages", e))?;

    Ok(render_conversation(&conversation, &messages))
}

fn render_conversation(conversation: &Conversation, messages: &[Message]) -> String {
    let mut output = String::new();
    output.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    output.push_str(&format!("  {}\n", conversation.title));
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    output.push_str(&format!("ID:       {}\n", conversation.id));
    output.push_str(&format!("Persona:  {}\n", conversation.persona));
    output.push_str(&format!("Tone:     {}\n", conversation.tone));
    output.push_str(&format!(
        "Created:  {}\n",
        format_timestamp(conversation.created_at)
    ));
    output.push_str(&format!(
        "Updated:  {}\n",
        format_timestamp(conversation.updated_at)
    ));

    if messages.is_empty() {
        output.push_str("\nNo messages.\n");
        return output;
    }

    output.push_str(&format!("\nMessages ({}):\n", messages.len()));
    for message in messages {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        output.push_str(&format!(
            "\n[{}] {}",
            format_timestamp(message.timestamp),
            speaker
        ));
        if let Some(metadata) = &message.metadata {
            output.push_str(&format!(" ({})", metadata));
        }
        output.push_str(&format!("\n{}\n", message.content));
    }

    output
}
