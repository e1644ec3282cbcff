//! # postloom-core
//!
//! Storage, configuration and shared types for Postloom.
//!
//! ## Features
//!
//! - SQLite storage for conversations, messages and generated posts
//! - Style and memory projections used to personalize new posts
//! - YAML configuration with environment overrides
//! - Daily summary export (text and CSV)
//!
//! ## Example
//!
//! ```no_run
//! use postloom_core::{Database, Role, StorageOperations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Database::open("~/.postloom/postloom.db").await?;
//!     let storage = db.storage();
//!
//!     storage
//!         .create_conversation("3f1c", "Post Generation: rust", "pirate", "Playful")
//!         .await?;
//!     storage
//!         .add_message("3f1c", Role::User, "Generate posts about: rust", None)
//!         .await?;
//!
//!     let samples = storage.style_samples(5).await?;
//!     println!("{} style samples", samples.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod storage;
pub mod summary;
pub mod types;

// Re-exports for convenience
pub use config::{AppConfig, GeneralSettings, ProviderSettings, RedditSettings};
pub use db::Database;
pub use error::{Error, Result};
pub use storage::{Storage, StorageOperations};
pub use summary::export_summary;
pub use types::{
    Conversation, GeneratedPost, GenerationRequest, HistoryEntry, LengthClass, MemoryItem,
    MemoryStats, Message, NewPost, PersonaCount, PostRecord, PostStats, Role, StyleSample,
    SummaryFormat,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
