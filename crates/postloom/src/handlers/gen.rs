//! Generation commands

use super::{generator_error, truncate};
use crate::state::AppState;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use postloom_core::types::{DEFAULT_PERSONA, DEFAULT_REGION, DEFAULT_TONE};
use postloom_core::GenerationRequest;
use postloom_generator::GenerationOutcome;
use sen::{Args, CliResult, State};
use std::time::Duration;

/// Generate posts for trending topics
///
/// Usage:
///   postloom gen --keyword rust --tone Playful
///   postloom gen -k eclipse -r japan -l Short --channel test --publish
#[derive(Parser, Debug)]
pub struct GenArgs {
    /// Keyword used to filter trending topics
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Tone of voice
    #[arg(short, long, default_value = DEFAULT_TONE)]
    pub tone: String,

    /// Audience region (united_states, united_kingdom, japan, germany, australia)
    #[arg(short, long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Persona the posts are written as
    #[arg(short, long, default_value = DEFAULT_PERSONA)]
    pub persona: String,

    /// Body length (Short, Standard, Extended)
    #[arg(short, long, default_value = "Standard")]
    pub length: String,

    /// Subreddit to publish to
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Publish each post to the channel after generating it
    #[arg(long)]
    pub publish: bool,

    /// Print full post bodies
    #[arg(long)]
    pub full: bool,
}

impl GenArgs {
    fn to_request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new()
            .tone(&self.tone)
            .region(&self.region)
            .persona(&self.persona)
            .length(&self.length);
        if let Some(keyword) = &self.keyword {
            request = request.keyword(keyword);
        }
        request.channel = self.channel.clone();
        request.auto_publish = self.publish;
        request
    }
}

#[sen::handler]
pub async fn generate(state: State<AppState>, Args(args): Args<GenArgs>) -> CliResult<String> {
    let app = state.read().await;
    let request = args.to_request();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Generating posts...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = app.generator.generate(&request).await;
    spinner.finish_and_clear();

    let outcome = result.map_err(generator_error)?;
    Ok(render_outcome(&outcome, args.full))
}

/// Refresh upvotes and comment counts of published posts
///
/// Usage:
///   postloom refresh
pub async fn refresh(state: State<AppState>) -> CliResult<String> {
    let app = state.read().await;
    let message = app
        .generator
        .refresh_engagement()
        .await
        .map_err(generator_error)?;
    Ok(format!("✓ {}", message))
}

fn render_outcome(outcome: &GenerationOutcome, full: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(Color::Green),
            Cell::new("Topic").fg(Color::Green),
            Cell::new("Title").fg(Color::Green),
            Cell::new("Link").fg(Color::Green),
        ]);

    for (idx, post) in outcome.posts.iter().enumerate() {
        let link = if post.published {
            Cell::new(&post.link).fg(Color::Cyan)
        } else {
            Cell::new(truncate(&post.link, 60))
        };
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&post.topic),
            Cell::new(&post.title),
            link,
        ]);
    }

    let mut output = format!("\n{}\n", table);
    if full {
        for post in &outcome.posts {
            output.push_str(&format!(
                "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n  {}\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n{}\n",
                post.title, post.body
            ));
        }
    }
    output.push_str(&format!(
        "\n✓ {}\n  Conversation: {}",
        outcome.message, outcome.conversation_id
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use postloom_core::{GeneratedPost, LengthClass};

    #[test]
    fn test_args_to_request() {
        let args = GenArgs::parse_from([
            "gen", "-k", " rust ", "-t", "Playful", "-l", "Gigantic", "-c", "rust", "--publish",
        ]);
        let request = args.to_request();
        assert_eq!(request.keyword_trimmed(), Some("rust"));
        assert_eq!(request.tone, "Playful");
        assert_eq!(request.region, DEFAULT_REGION);
        assert_eq!(request.length, LengthClass::Standard);
        assert_eq!(request.publish_channel(), Some("rust"));
    }

    #[test]
    fn test_channel_without_publish_flag() {
        let args = GenArgs::parse_from(["gen", "--channel", "rust"]);
        assert_eq!(args.to_request().publish_channel(), None);
    }

    #[test]
    fn test_render_outcome() {
        let outcome = GenerationOutcome {
            conversation_id: "c-1".to_string(),
            posts: vec![GeneratedPost {
                topic: "Eclipse".to_string(),
                title: "Look up!".to_string(),
                body: "It is dark at noon.".to_string(),
                link: "[Skipped]".to_string(),
                published: false,
            }],
            message: "Generated 1 posts.".to_string(),
        };

        let short = render_outcome(&outcome, false);
        assert!(short.contains("Eclipse"));
        assert!(short.contains("✓ Generated 1 posts."));
        assert!(short.contains("Conversation: c-1"));
        assert!(!short.contains("It is dark at noon."));

        assert!(render_outcome(&outcome, true).contains("It is dark at noon."));
    }
}
