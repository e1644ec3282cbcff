//! Publishing generated posts to Reddit

use crate::error::PublishError;
use crate::provider::{http_client, trim_base, upstream_detail};
use async_trait::async_trait;
use postloom_core::RedditSettings;
use reqwest::header::USER_AGENT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com";
const REDDIT_API_URL: &str = "https://oauth.reddit.com";

/// Authenticated session able to submit posts
#[async_trait]
pub trait PublishClient: Send + Sync {
    /// Submit a self-post and return its URL
    async fn submit(&self, channel: &str, title: &str, body: &str) -> Result<String, PublishError>;

    /// Current (score, comment count) of a submission
    async fn engagement(&self, url: &str) -> Result<(i64, i64), PublishError>;
}

/// Factory for publish clients
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Authenticate with `settings`
    ///
    /// Returns `Ok(None)` when the credentials are incomplete and
    /// `Err(PublishError::Auth)` when they are rejected.
    async fn connect(
        &self,
        settings: &RedditSettings,
    ) -> Result<Option<Arc<dyn PublishClient>>, PublishError>;
}

enum Grant<'a> {
    Password {
        client_id: &'a str,
        client_secret: &'a str,
        username: &'a str,
        password: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        refresh_token: &'a str,
    },
}

impl<'a> Grant<'a> {
    fn from_settings(settings: &'a RedditSettings) -> Option<Self> {
        let client_id = settings.client_id.trim();
        let refresh_token = settings.refresh_token.trim();
        if !refresh_token.is_empty() {
            return Some(Grant::RefreshToken {
                client_id,
                refresh_token,
            });
        }

        let client_secret = settings.client_secret.trim();
        let username = settings.username.trim();
        let password = settings.password.trim();
        let user_agent = settings.user_agent.trim();
        let complete = [client_id, client_secret, username, password, user_agent]
            .iter()
            .all(|field| !field.is_empty());
        complete.then_some(Grant::Password {
            client_id,
            client_secret,
            username,
            password,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Reddit OAuth publisher
pub struct RedditPublisher {
    client: Client,
    auth_url: String,
    api_url: String,
}

impl RedditPublisher {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            auth_url: REDDIT_AUTH_URL.to_string(),
            api_url: REDDIT_API_URL.to_string(),
        }
    }

    /// Use other endpoints for token exchange and API calls
    pub fn with_base_urls(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = trim_base(auth_url);
        self.api_url = trim_base(api_url);
        self
    }

    async fn access_token(&self, grant: &Grant<'_>, user_agent: &str) -> Result<String, PublishError> {
        let url = format!("{}/api/v1/access_token", self.auth_url);
        let request = self.client.post(&url).header(USER_AGENT, user_agent);
        let request = match grant {
            Grant::Password {
                client_id,
                client_secret,
                username,
                password,
            } => request.basic_auth(client_id, Some(client_secret)).form(&[
                ("grant_type", "password"),
                ("username", *username),
                ("password", *password),
            ]),
            Grant::RefreshToken {
                client_id,
                refresh_token,
            } => request.basic_auth(client_id, Some("")).form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", *refresh_token),
            ]),
        };

        let (status, text) = send(request).await.map_err(PublishError::Auth)?;
        if !status.is_success() {
            return Err(PublishError::Auth(
                upstream_detail(&text).unwrap_or_else(|| status.to_string()),
            ));
        }

        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| PublishError::MalformedResponse(e.to_string()))?;
        match (token.access_token, token.error) {
            (Some(token), _) if !token.is_empty() => Ok(token),
            (_, Some(error)) => Err(PublishError::Auth(error)),
            _ => Err(PublishError::Auth("no access token returned".to_string())),
        }
    }
}

impl Default for RedditPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for RedditPublisher {
    async fn connect(
        &self,
        settings: &RedditSettings,
    ) -> Result<Option<Arc<dyn PublishClient>>, PublishError> {
        let Some(grant) = Grant::from_settings(settings) else {
            debug!("Reddit credentials incomplete");
            return Ok(None);
        };

        let user_agent = settings.user_agent.trim().to_string();
        let token = self.access_token(&grant, &user_agent).await?;
        let client = RedditClient {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            token,
            user_agent,
        };
        client.validate().await?;

        info!("Authenticated with Reddit");
        Ok(Some(Arc::new(client)))
    }
}

/// Session holding a bearer token
pub struct RedditClient {
    client: Client,
    api_url: String,
    token: String,
    user_agent: String,
}

impl RedditClient {
    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
    }

    async fn validate(&self) -> Result<(), PublishError> {
        let (status, text) = send(self.get("/api/v1/me")).await.map_err(PublishError::Auth)?;
        if status.is_success() {
            Ok(())
        } else {
            Err(PublishError::Auth(
                upstream_detail(&text).unwrap_or_else(|| status.to_string()),
            ))
        }
    }
}

#[async_trait]
impl PublishClient for RedditClient {
    async fn submit(&self, channel: &str, title: &str, body: &str) -> Result<String, PublishError> {
        let request = self.post("/api/submit").form(&[
            ("sr", channel),
            ("kind", "self"),
            ("title", title),
            ("text", body),
            ("api_type", "json"),
        ]);
        let value = send_json(request).await?;

        if let Some(errors) = value.pointer("/json/errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(PublishError::Request(render_errors(errors)));
            }
        }

        value
            .pointer("/json/data/url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PublishError::MalformedResponse("missing json.data.url".to_string()))
    }

    async fn engagement(&self, url: &str) -> Result<(i64, i64), PublishError> {
        let value = send_json(self.get("/api/info").query(&[("url", url)])).await?;
        let submission = value
            .pointer("/data/children/0/data")
            .ok_or_else(|| PublishError::Request(format!("Submission not found: {}", url)))?;

        let score = submission.get("score").and_then(Value::as_i64).unwrap_or(0);
        let comments = submission
            .get("num_comments")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok((score, comments))
    }
}

async fn send(request: RequestBuilder) -> Result<(StatusCode, String), String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    let text = response.text().await.map_err(|e| e.to_string())?;
    Ok((status, text))
}

async fn send_json(request: RequestBuilder) -> Result<Value, PublishError> {
    let (status, text) = send(request).await.map_err(PublishError::Request)?;
    if !status.is_success() {
        return Err(PublishError::Request(
            upstream_detail(&text).unwrap_or_else(|| status.to_string()),
        ));
    }
    serde_json::from_str(&text).map_err(|e| PublishError::MalformedResponse(e.to_string()))
}

/// `[["CODE", "message", "field"], ...]` rendered as `CODE: message; ...`
fn render_errors(errors: &[Value]) -> String {
    errors
        .iter()
        .map(|error| match error.as_array() {
            Some(parts) => parts
                .iter()
                .take(2)
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(": "),
            None => error.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn password_settings() -> RedditSettings {
        RedditSettings {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            username: "poster".to_string(),
            password: "hunter2".to_string(),
            ..RedditSettings::default()
        }
    }

    async fn mount_auth(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/me"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "poster"})))
            .mount(server)
            .await;
    }

    #[test]
    fn test_incomplete_credentials() {
        assert!(Grant::from_settings(&RedditSettings::default()).is_none());

        let mut settings = password_settings();
        settings.password = " ".to_string();
        assert!(Grant::from_settings(&settings).is_none());

        settings.refresh_token = "refresh".to_string();
        assert!(matches!(
            Grant::from_settings(&settings),
            Some(Grant::RefreshToken { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_without_credentials_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let publisher = RedditPublisher::new().with_base_urls(server.uri(), server.uri());
        let client = publisher.connect(&RedditSettings::default()).await.unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let publisher = RedditPublisher::new().with_base_urls(server.uri(), server.uri());
        let err = publisher.connect(&password_settings()).await.err().unwrap();
        assert_eq!(err, PublishError::Auth("invalid_grant".to_string()));
    }

    #[tokio::test]
    async fn test_submit_and_engagement() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/submit"))
            .and(body_string_contains("sr=rust"))
            .and(body_string_contains("kind=self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [], "data": {"url": "https://www.reddit.com/r/rust/comments/abc/"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/info"))
            .and(query_param("url", "https://www.reddit.com/r/rust/comments/abc/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"children": [{"data": {"score": 42, "num_comments": 7}}]}
            })))
            .mount(&server)
            .await;

        let publisher = RedditPublisher::new().with_base_urls(server.uri(), server.uri());
        let client = publisher.connect(&password_settings()).await.unwrap().unwrap();

        let url = client.submit("rust", "Title", "Body").await.unwrap();
        assert_eq!(url, "https://www.reddit.com/r/rust/comments/abc/");
        assert_eq!(client.engagement(&url).await.unwrap(), (42, 7));
    }

    #[tokio::test]
    async fn test_submit_errors_are_reported() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"]]}
            })))
            .mount(&server)
            .await;

        let publisher = RedditPublisher::new().with_base_urls(server.uri(), server.uri());
        let client = publisher.connect(&password_settings()).await.unwrap().unwrap();
        let err = client.submit("nope", "t", "b").await.unwrap_err();
        assert_eq!(
            err,
            PublishError::Request("SUBREDDIT_NOEXIST: that subreddit doesn't exist".to_string())
        );
    }
}
