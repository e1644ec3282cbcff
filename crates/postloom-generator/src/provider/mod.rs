//! Text-generation providers
//!
//! Every provider implements [`Provider`]. A [`ProviderRegistry`] holds one
//! instance per [`ProviderKind`] and picks one for each call by looking at the
//! model identifier through a [`RoutingPolicy`].

mod compat;
mod google;
mod groq;
mod openai;
mod registry;
mod routing;
mod traits;

pub use google::GoogleProvider;
pub use groq::GroqProvider;
pub use openai::OpenAIProvider;
pub use registry::ProviderRegistry;
pub use routing::{RoutingPolicy, RoutingRule};
pub use traits::Provider;

use crate::error::ProviderError;
use postloom_core::ProviderSettings;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timeout applied to every outbound provider request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Known provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    Google,
    OpenAI,
}

impl ProviderKind {
    /// All kinds, in registration order
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Groq, ProviderKind::Google, ProviderKind::OpenAI];

    /// Configuration name of this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Look up a kind by its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(ProviderKind::Groq),
            "google" => Some(ProviderKind::Google),
            "openai" => Some(ProviderKind::OpenAI),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a provider by name
///
/// Returns `None` for names that do not denote a known provider.
pub fn create_provider(name: &str, settings: &ProviderSettings) -> Option<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match ProviderKind::from_name(name)? {
        ProviderKind::Groq => Arc::new(GroqProvider::new(&settings.api_key)),
        ProviderKind::Google => Arc::new(GoogleProvider::new(&settings.api_key)),
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(&settings.api_key)),
    };
    debug!("Created provider: {}", name);
    Some(provider)
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Send a request and decode the JSON body
///
/// Transport failures and non-success statuses become `Upstream`, a body of
/// the wrong shape becomes `MalformedResponse`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    kind: ProviderKind,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::upstream(kind, e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::upstream(kind, e.to_string()))?;

    if !status.is_success() {
        let detail = upstream_detail(&text).unwrap_or_else(|| status.to_string());
        return Err(ProviderError::upstream(kind, detail));
    }

    serde_json::from_str(&text).map_err(|e| ProviderError::malformed(kind, e.to_string()))
}

/// Error message from an upstream error body
///
/// Prefers `error.message`, then `message`, then the raw text.
pub(crate) fn upstream_detail(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
            });
        if let Some(message) = message {
            return Some(message.to_string());
        }
    }

    let raw = body.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Trim a base URL so paths can be appended with `/`
pub(crate) fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
