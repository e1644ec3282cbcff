//! Topic discovery

use crate::provider::http_client;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const TRENDS_BASE_URL: &str = "https://trends.google.com/trends/api";
const BING_BASE_URL: &str = "https://www.bing.com";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
/// Query used for news headlines when no keyword is given
pub const DEFAULT_NEWS_QUERY: &str = "news";
/// Maximum number of topics returned by [`TrendingTopics`] and [`BingNews`]
pub const TOPIC_LIMIT: usize = 5;

/// Source of topics for a generation run
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Topics for an optional keyword filter and a region; may be empty
    async fn resolve(&self, keyword: Option<&str>, region: &str) -> Vec<String>;
}

/// Country code for a region identifier
pub fn region_code(region: &str) -> &'static str {
    match region {
        "united_states" => "US",
        "united_kingdom" => "GB",
        "japan" => "JP",
        "germany" => "DE",
        "australia" => "AU",
        _ => "US",
    }
}

/// Daily trending searches from Google Trends
pub struct TrendingTopics {
    client: Client,
    base_url: String,
    limit: usize,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TrendsPayload {
    default: TrendsDefault,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct TrendsDefault {
    trending_searches_days: Vec<TrendingDay>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct TrendingDay {
    trending_searches: Vec<TrendingSearch>,
}

#[derive(Deserialize)]
struct TrendingSearch {
    title: TrendingTitle,
}

#[derive(Deserialize)]
struct TrendingTitle {
    query: String,
}

impl TrendingTopics {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: TRENDS_BASE_URL.to_string(),
            limit: TOPIC_LIMIT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = crate::provider::trim_base(base_url);
        self
    }

    async fn fetch(&self, geo: &str) -> Option<String> {
        let request = self
            .client
            .get(format!("{}/dailytrends", self.base_url))
            .query(&[("geo", geo)]);
        fetch_text(request, "Google Trends").await
    }
}

impl Default for TrendingTopics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicSource for TrendingTopics {
    async fn resolve(&self, keyword: Option<&str>, region: &str) -> Vec<String> {
        let geo = region_code(region);
        let Some(raw) = self.fetch(geo).await else {
            return Vec::new();
        };
        let topics = parse_daily_trends(&raw, keyword, self.limit);
        debug!("Resolved {} trending topics for {}", topics.len(), geo);
        topics
    }
}

/// Extract trending queries from a daily-trends response
///
/// The response starts with an anti-XSSI line that is dropped before parsing.
/// Anything unparseable yields no topics.
pub fn parse_daily_trends(raw: &str, keyword: Option<&str>, limit: usize) -> Vec<String> {
    let json = raw.split_once('\n').map(|(_, rest)| rest).unwrap_or("").trim();
    if !json.starts_with('{') {
        return Vec::new();
    }

    let payload: TrendsPayload = match serde_json::from_str(json) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Google Trends payload invalid: {}", e);
            return Vec::new();
        }
    };

    let keyword = keyword
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());

    payload
        .default
        .trending_searches_days
        .into_iter()
        .flat_map(|day| day.trending_searches)
        .map(|search| search.title.query)
        .filter(|query| match &keyword {
            Some(k) => query.to_lowercase().contains(k.as_str()),
            None => true,
        })
        .take(limit)
        .collect()
}

/// Headlines from the Bing News RSS feed
///
/// The keyword (or `news` without one) is the search query; region is ignored.
pub struct BingNews {
    client: Client,
    base_url: String,
    limit: usize,
}

impl BingNews {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: BING_BASE_URL.to_string(),
            limit: TOPIC_LIMIT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = crate::provider::trim_base(base_url);
        self
    }
}

impl Default for BingNews {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicSource for BingNews {
    async fn resolve(&self, keyword: Option<&str>, _region: &str) -> Vec<String> {
        let query = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_NEWS_QUERY);
        let request = self
            .client
            .get(format!("{}/news/search", self.base_url))
            .query(&[("q", query), ("format", "RSS")]);
        let Some(raw) = fetch_text(request, "Bing News").await else {
            return Vec::new();
        };
        let topics = parse_news_feed(&raw, self.limit);
        debug!("Resolved {} news headlines for {:?}", topics.len(), query);
        topics
    }
}

/// Item titles of an RSS feed, in feed order
///
/// Items without a title are skipped; an unreadable feed yields no topics.
pub fn parse_news_feed(raw: &str, limit: usize) -> Vec<String> {
    let channel = match rss::Channel::read_from(raw.as_bytes()) {
        Ok(channel) => channel,
        Err(e) => {
            warn!("Bing News feed invalid: {}", e);
            return Vec::new();
        }
    };

    channel
        .items()
        .iter()
        .filter_map(|item| item.title())
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .take(limit)
        .collect()
}

/// Tries `primary`, falling back to `fallback` when it finds nothing
pub struct FallbackTopics {
    primary: Arc<dyn TopicSource>,
    fallback: Arc<dyn TopicSource>,
}

impl FallbackTopics {
    pub fn new(primary: Arc<dyn TopicSource>, fallback: Arc<dyn TopicSource>) -> Self {
        Self { primary, fallback }
    }

    /// Google Trends first, then Bing News headlines
    pub fn trends_then_news() -> Self {
        Self::new(Arc::new(TrendingTopics::new()), Arc::new(BingNews::new()))
    }
}

#[async_trait]
impl TopicSource for FallbackTopics {
    async fn resolve(&self, keyword: Option<&str>, region: &str) -> Vec<String> {
        let topics = self.primary.resolve(keyword, region).await;
        if !topics.is_empty() {
            return topics;
        }
        debug!("Primary topic source empty, using fallback");
        self.fallback.resolve(keyword, region).await
    }
}

async fn fetch_text(request: RequestBuilder, source: &str) -> Option<String> {
    let response = match request
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("{} request error: {}", source, e);
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!("{} request failed ({})", source, status);
        return None;
    }

    match response.text().await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("{} response unreadable: {}", source, e);
            None
        }
    }
}

/// Fixed list of topics, ignoring keyword and region
#[derive(Debug, Clone, Default)]
pub struct FixedTopics {
    topics: Vec<String>,
}

impl FixedTopics {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TopicSource for FixedTopics {
    async fn resolve(&self, _keyword: Option<&str>, _region: &str) -> Vec<String> {
        self.topics.clone()
    }
}
