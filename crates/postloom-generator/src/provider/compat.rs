//! OpenAI-compatible chat completions, shared by Groq and OpenAI

use super::{send_json, ProviderKind};
use crate::error::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl<'a> ChatRequest<'a> {
    /// Single user-turn request
    pub fn user(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// POST `{base_url}/chat/completions` and return the first choice's content
pub(crate) async fn chat_completion(
    kind: ProviderKind,
    client: &Client,
    base_url: &str,
    api_key: &str,
    request: &ChatRequest<'_>,
) -> Result<String, ProviderError> {
    let url = format!("{}/chat/completions", base_url);
    let response: ChatResponse =
        send_json(kind, client.post(&url).bearer_auth(api_key).json(request)).await?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| ProviderError::malformed(kind, "response contained no choices"))
}
