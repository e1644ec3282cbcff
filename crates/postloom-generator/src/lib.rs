//! # postloom-generator
//!
//! LLM-powered social post generation for Postloom.
//!
//! ## Features
//!
//! - Groq, Google and OpenAI providers behind one [`Provider`] trait
//! - Model-prefix routing through an explicit [`ProviderRegistry`]
//! - Style context built from previous posts and conversations
//! - Trending topic discovery with a news-headline fallback
//! - Optional publishing to Reddit
//!
//! ## Example
//!
//! ```no_run
//! use postloom_core::{AppConfig, Database, GenerationRequest};
//! use postloom_generator::PostGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load().await?;
//!     let db = Database::open(config.database_path()?).await?;
//!     let generator = PostGenerator::new(&db, &config);
//!
//!     let request = GenerationRequest::new()
//!         .keyword("eclipse")
//!         .tone("Playful")
//!         .length("Short");
//!     let outcome = generator.generate(&request).await?;
//!
//!     for post in &outcome.posts {
//!         println!("{}: {}", post.topic, post.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod generator;
pub mod prompts;
pub mod provider;
pub mod publish;
pub mod style;
pub mod topics;

// Re-exports
pub use error::{Error, ProviderError, ProviderErrorKind, PublishError, Result};
pub use generator::{GenerationOutcome, GeneratorOptions, PostGenerator};
pub use provider::{
    create_provider, GoogleProvider, GroqProvider, OpenAIProvider, Provider, ProviderKind,
    ProviderRegistry, RoutingPolicy, RoutingRule,
};
pub use publish::{PublishClient, Publisher, RedditPublisher};
pub use style::StyleContextBuilder;
pub use topics::{BingNews, FallbackTopics, FixedTopics, TopicSource, TrendingTopics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
