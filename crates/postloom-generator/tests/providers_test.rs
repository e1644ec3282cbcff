//! HTTP-level tests for the text-generation providers

use postloom_generator::{
    GoogleProvider, GroqProvider, OpenAIProvider, Provider, ProviderErrorKind, ProviderKind,
    ProviderRegistry,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn groq_sends_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "messages": [{"role": "user", "content": "Say hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("  Hi there!\n")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GroqProvider::new("gsk-test").with_base_url(server.uri());
    let text = provider.generate("", "Say hi").await.unwrap();
    assert_eq!(text, "Hi there!");
}

#[tokio::test]
async fn groq_substitutes_deprecated_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "llama-3.1-70b-versatile"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GroqProvider::new("gsk-test").with_base_url(server.uri());
    assert_eq!(provider.generate("llama3-70b-8192", "p").await.unwrap(), "ok");
}

#[tokio::test]
async fn missing_key_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("never")))
        .expect(0)
        .mount(&server)
        .await;

    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(GroqProvider::new("").with_base_url(server.uri())),
        Arc::new(GoogleProvider::new("").with_base_url(server.uri())),
        Arc::new(OpenAIProvider::new("   ").with_base_url(server.uri())),
    ];

    for provider in providers {
        let err = provider.generate("", "prompt").await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::CredentialMissing);
        assert_eq!(err.provider, provider.kind());
        assert!(err.is_configuration());
    }
}

#[tokio::test]
async fn upstream_error_message_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let provider = GroqProvider::new("bad").with_base_url(server.uri());
    let err = provider.generate("", "p").await.unwrap_err();
    assert_eq!(
        err.kind,
        ProviderErrorKind::Upstream("Invalid API Key".to_string())
    );
    assert_eq!(err.to_string(), "Groq request failed: Invalid API Key");
}

#[tokio::test]
async fn upstream_plain_text_error_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new("sk-test").with_base_url(server.uri());
    let err = provider.generate("gpt-4o", "p").await.unwrap_err();
    assert_eq!(
        err.kind,
        ProviderErrorKind::Upstream("upstream overloaded".to_string())
    );
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = GroqProvider::new("gsk-test").with_base_url(server.uri());
    let err = provider.generate("", "p").await.unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::MalformedResponse(_)));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = GroqProvider::new("gsk-test").with_base_url(server.uri());
    let err = provider.generate("", "p").await.unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::MalformedResponse(_)));
    assert!(err.to_string().starts_with("Unexpected Groq response format:"));
}

#[tokio::test]
async fn openai_sends_sampling_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 512,
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("A title")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new("sk-test").with_base_url(server.uri());
    assert_eq!(provider.generate("gpt-4o-mini", "p").await.unwrap(), "A title");
}

#[tokio::test]
async fn google_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Describe tea"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": " Warm and calm. "}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("g-key").with_base_url(server.uri());
    assert_eq!(
        provider.generate(" ", "Describe tea").await.unwrap(),
        "Warm and calm."
    );
}

#[tokio::test]
async fn google_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid."}
        })))
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("g-key").with_base_url(server.uri());
    let err = provider.generate("gemini-1.5-pro", "p").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Google API request failed: API key not valid."
    );
}

#[tokio::test]
async fn registry_routes_to_each_provider() {
    let groq = MockServer::start().await;
    let google = MockServer::start().await;
    let openai = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("from groq")))
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "from google"}]}}]
        })))
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("from openai")))
        .mount(&openai)
        .await;

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(GroqProvider::new("k1").with_base_url(groq.uri())));
    registry.register(Arc::new(GoogleProvider::new("k2").with_base_url(google.uri())));
    registry.register(Arc::new(OpenAIProvider::new("k3").with_base_url(openai.uri())));

    assert_eq!(registry.routing().route("gpt-4o-mini"), ProviderKind::OpenAI);
    assert_eq!(
        registry.generate("gpt-4o-mini", "p").await.unwrap(),
        "from openai"
    );
    assert_eq!(
        registry.generate("gemini-1.5-pro", "p").await.unwrap(),
        "from google"
    );
    assert_eq!(
        registry.generate("llama-3.1-8b-instant", "p").await.unwrap(),
        "from groq"
    );
}
