//! Postloom CLI - social post generation
//!
//! Generates post drafts for trending topics with Groq, Google or OpenAI
//! models, optionally publishes them to Reddit, and keeps a history that
//! personalizes later runs.

mod handlers;
mod state;

use handlers::{config, conversations, gen, history, stats, summary};
use sen::Router;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize application state
    let state = match AppState::new().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize Postloom: {}", e);
            std::process::exit(1);
        }
    };

    // Build router
    let router = Router::new()
        // Generation
        .route("gen", gen::generate())
        .route("refresh", gen::refresh)

        // History and analytics
        .route("history", history::history())
        .route("stats", stats::stats)
        .route("memory", stats::memory)
        .route("summary", summary::summary())

        // Conversations
        .route("conversations", conversations::list())
        .route("show", conversations::show())

        // Settings
        .route("config", config::show)

        .with_state(state)
        .with_agent_mode(); // JSON output for LLM integration

    // Execute
    let response = router.execute().await;

    // Output
    if response.agent_mode {
        println!("{}", response.to_agent_json());
    } else if !response.output.is_empty() {
        println!("{}", response.output);
    }

    std::process::exit(response.exit_code);
}
