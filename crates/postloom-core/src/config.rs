//! Application configuration
//!
//! Configuration lives in `~/.postloom/config.yaml`. Every field is optional:
//! a missing file or key yields an empty string (or the documented default),
//! so that a missing credential is reported by whoever needs it rather than
//! by the loader. Environment variables override the file.

use crate::db::{expand_path, home_dir};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default Groq model
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
/// Default Google model
pub const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default OpenAI model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Groq models that were retired, with their replacements
pub const GROQ_DEPRECATED_MODELS: &[(&str, &str)] = &[
    ("llama3-8b-8192", GROQ_DEFAULT_MODEL),
    ("llama3-70b-8192", "llama-3.1-70b-versatile"),
];
/// Default user agent for the Reddit API
pub const DEFAULT_USER_AGENT: &str = "postloom-agent/0.1";
/// Default delay between topics in milliseconds
pub const DEFAULT_PACING_MS: u64 = 200;

/// Credentials and model for one language-model provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
}

impl ProviderSettings {
    /// Create settings from a key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

/// Reddit script-app or refresh-token credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub refresh_token: String,
    pub user_agent: String,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            refresh_token: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// General settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Provider whose model is used for text generation
    pub default_provider: String,
    /// SQLite database location
    pub database_path: Option<PathBuf>,
    /// Minimum delay between topics of one run
    pub pacing_ms: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_provider: "groq".to_string(),
            database_path: None,
            pacing_ms: DEFAULT_PACING_MS,
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub groq: ProviderSettings,
    pub google: ProviderSettings,
    pub openai: ProviderSettings,
    pub reddit: RedditSettings,
    pub settings: GeneralSettings,
}

impl AppConfig {
    /// Default config file location (~/.postloom/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".postloom").join("config.yaml"))
    }

    /// Load from the default location, then apply environment overrides
    pub async fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?).await
    }

    /// Load from `path`, then apply environment overrides
    ///
    /// A missing file is not an error.
    pub async fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path)?;
        let mut config = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                info!("Loading configuration from: {}", path.display());
                Self::from_yaml(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    /// Parse YAML text. Missing keys take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write to `path`, creating parent directories
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = expand_path(path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, self.to_yaml()?).await?;
        info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Settings for a provider by name (`groq`, `google`, `openai`)
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        match name {
            "groq" => Some(&self.groq),
            "google" => Some(&self.google),
            "openai" => Some(&self.openai),
            _ => None,
        }
    }

    /// Model used for text generation: the default provider's configured model
    pub fn text_model(&self) -> &str {
        self.provider(&self.settings.default_provider)
            .unwrap_or(&self.groq)
            .model
            .as_str()
    }

    /// Database path, falling back to the default location
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.settings.database_path {
            Some(path) => expand_path(path),
            None => crate::Database::default_path(),
        }
    }

    /// Override values from `POSTLOOM_*` variables
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = var(key) {
                *target = value;
            }
        };

        set(&mut self.groq.api_key, "POSTLOOM_GROQ_API_KEY");
        set(&mut self.groq.model, "POSTLOOM_GROQ_MODEL");
        set(&mut self.google.api_key, "POSTLOOM_GOOGLE_API_KEY");
        set(&mut self.google.model, "POSTLOOM_GOOGLE_MODEL");
        set(&mut self.openai.api_key, "POSTLOOM_OPENAI_API_KEY");
        set(&mut self.openai.model, "POSTLOOM_OPENAI_MODEL");
        set(&mut self.reddit.client_id, "POSTLOOM_REDDIT_CLIENT_ID");
        set(&mut self.reddit.client_secret, "POSTLOOM_REDDIT_CLIENT_SECRET");
        set(&mut self.reddit.username, "POSTLOOM_REDDIT_USERNAME");
        set(&mut self.reddit.password, "POSTLOOM_REDDIT_PASSWORD");
        set(&mut self.reddit.refresh_token, "POSTLOOM_REDDIT_REFRESH_TOKEN");
        set(&mut self.reddit.user_agent, "POSTLOOM_REDDIT_USER_AGENT");
        set(&mut self.settings.default_provider, "POSTLOOM_DEFAULT_PROVIDER");

        if let Some(model) = var("POSTLOOM_TEXT_MODEL") {
            let provider = self.settings.default_provider.clone();
            match provider.as_str() {
                "google" => self.google.model = model,
                "openai" => self.openai.model = model,
                _ => self.groq.model = model,
            }
        }
        if let Some(path) = var("POSTLOOM_DATABASE") {
            self.settings.database_path = Some(PathBuf::from(path));
        }
        if let Some(ms) = var("POSTLOOM_PACING_MS").and_then(|v| v.parse().ok()) {
            self.settings.pacing_ms = ms;
        }
    }

    /// Fill blank models and map retired Groq models
    fn normalize(&mut self) {
        let groq_model = self.groq.model.trim();
        if let Some((_, current)) = GROQ_DEPRECATED_MODELS
            .iter()
            .find(|(old, _)| *old == groq_model)
        {
            self.groq.model = current.to_string();
        }
        for (settings, default) in [
            (&mut self.groq, GROQ_DEFAULT_MODEL),
            (&mut self.google, GOOGLE_DEFAULT_MODEL),
            (&mut self.openai, OPENAI_DEFAULT_MODEL),
        ] {
            if settings.model.trim().is_empty() {
                settings.model = default.to_string();
            }
        }
        if self.reddit.user_agent.trim().is_empty() {
            self.reddit.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        if self.settings.default_provider.trim().is_empty() {
            self.settings.default_provider = "groq".to_string();
        }
    }
}
