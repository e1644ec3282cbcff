use super::compat::{chat_completion, ChatRequest};
use super::{http_client, trim_base, Provider, ProviderKind};
use crate::error::ProviderError;
use async_trait::async_trait;
use postloom_core::config::OPENAI_DEFAULT_MODEL;
use reqwest::Client;
use tracing::debug;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 512;
const TEMPERATURE: f32 = 0.7;

/// OpenAI chat completions
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url);
        self
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn default_model(&self) -> &'static str {
        OPENAI_DEFAULT_MODEL
    }

    fn supported_models(&self) -> Vec<&'static str> {
        vec![
            OPENAI_DEFAULT_MODEL,
            "gpt-4",
            "gpt-4-turbo",
            "gpt-4o",
            "gpt-4o-mini",
        ]
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::credential_missing(ProviderKind::OpenAI));
        }

        let model = self.resolve_model(model);
        debug!("OpenAI completion: model={}, prompt_len={}", model, prompt.len());

        let mut request = ChatRequest::user(&model, prompt);
        request.max_tokens = Some(MAX_TOKENS);
        request.temperature = Some(TEMPERATURE);

        chat_completion(
            ProviderKind::OpenAI,
            &self.client,
            &self.base_url,
            &self.api_key,
            &request,
        )
        .await
    }
}
