//! Application state

use postloom_core::{AppConfig, Database};
use postloom_generator::PostGenerator;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Database connection
    pub db: Arc<Database>,
    /// Post generation pipeline
    pub generator: Arc<PostGenerator>,
}

impl AppState {
    /// Load configuration, open the database and wire the generator
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::load().await?;

        let db = Database::open(config.database_path()?).await?;

        let generator = PostGenerator::new(&db, &config);
        info!("Postloom ready (text model: {})", config.text_model());

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            generator: Arc::new(generator),
        })
    }
}
