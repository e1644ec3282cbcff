use super::{http_client, send_json, trim_base, Provider, ProviderKind};
use crate::error::ProviderError;
use async_trait::async_trait;
use postloom_core::config::GOOGLE_DEFAULT_MODEL;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language (Gemini) `generateContent`
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: GOOGLE_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url);
        self
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn default_model(&self) -> &'static str {
        GOOGLE_DEFAULT_MODEL
    }

    fn supported_models(&self) -> Vec<&'static str> {
        vec![
            GOOGLE_DEFAULT_MODEL,
            "gemini-1.5-flash",
            "gemini-1.5-pro",
            "gemini-pro",
        ]
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::credential_missing(ProviderKind::Google));
        }

        let model = self.resolve_model(model);
        debug!("Google completion: model={}, prompt_len={}", model, prompt.len());

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
        };

        let response: GenerateResponse = send_json(
            ProviderKind::Google,
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body),
        )
        .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| {
                ProviderError::malformed(ProviderKind::Google, "response contained no candidate text")
            })
    }
}
