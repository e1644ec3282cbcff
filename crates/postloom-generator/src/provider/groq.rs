use super::compat::{chat_completion, ChatRequest};
use super::{http_client, trim_base, Provider, ProviderKind};
use crate::error::ProviderError;
use async_trait::async_trait;
use postloom_core::config::{GROQ_DEFAULT_MODEL, GROQ_DEPRECATED_MODELS};
use reqwest::Client;
use tracing::debug;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq chat completions
pub struct GroqProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GroqProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: GROQ_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Send requests to another endpoint (proxy or test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url);
        self
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn default_model(&self) -> &'static str {
        GROQ_DEFAULT_MODEL
    }

    /// Retired models are swapped for their replacement before a blank check
    fn resolve_model(&self, model: &str) -> String {
        let model = model.trim();
        if let Some((_, current)) = GROQ_DEPRECATED_MODELS.iter().find(|(old, _)| *old == model) {
            return current.to_string();
        }
        if model.is_empty() {
            GROQ_DEFAULT_MODEL.to_string()
        } else {
            model.to_string()
        }
    }

    fn supported_models(&self) -> Vec<&'static str> {
        vec![GROQ_DEFAULT_MODEL, "llama-3.1-70b-versatile", "llama-guard-3-8b"]
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::credential_missing(ProviderKind::Groq));
        }

        let model = self.resolve_model(model);
        debug!("Groq completion: model={}, prompt_len={}", model, prompt.len());

        let request = ChatRequest::user(&model, prompt);
        chat_completion(
            ProviderKind::Groq,
            &self.client,
            &self.base_url,
            &self.api_key,
            &request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        let provider = GroqProvider::new("key");
        assert_eq!(provider.resolve_model(""), GROQ_DEFAULT_MODEL);
        assert_eq!(provider.resolve_model("  "), GROQ_DEFAULT_MODEL);
        assert_eq!(provider.resolve_model("llama3-8b-8192"), GROQ_DEFAULT_MODEL);
        assert_eq!(
            provider.resolve_model("llama3-70b-8192"),
            "llama-3.1-70b-versatile"
        );
        assert_eq!(provider.resolve_model("mixtral-8x7b"), "mixtral-8x7b");
    }

    #[tokio::test]
    async fn test_blank_key_fails_locally() {
        let provider = GroqProvider::new(" ").with_base_url("http://127.0.0.1:9");
        let err = provider.generate("", "hello").await.unwrap_err();
        assert_eq!(err, ProviderError::credential_missing(ProviderKind::Groq));
    }
}
