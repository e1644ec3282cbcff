//! Post generation run

use crate::prompts::{body_prompt, clamp_title, title_prompt, PostBrief};
use crate::provider::ProviderRegistry;
use crate::publish::{PublishClient, Publisher, RedditPublisher};
use crate::style::{StyleContextBuilder, DEFAULT_MEMORY_LIMIT, DEFAULT_SAMPLE_LIMIT};
use crate::topics::{FallbackTopics, TopicSource};
use crate::{Error, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use postloom_core::config::GROQ_DEFAULT_MODEL;
use postloom_core::{
    AppConfig, Database, GeneratedPost, GenerationRequest, NewPost, RedditSettings, Role, Storage,
    StorageOperations,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Link stored when a post was not published
pub const SKIPPED_LINK: &str = "[Skipped]";
/// Maximum length of a stored publish failure
pub const PUBLISH_FAILURE_LIMIT: usize = 250;

/// Generation options
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Model identifier passed to the provider registry
    pub model: String,
    /// Minimum spacing between topics; zero disables pacing
    pub pacing: Duration,
    /// Past posts sampled for the style context
    pub sample_limit: usize,
    /// Memory items fetched for the style context
    pub memory_limit: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            model: GROQ_DEFAULT_MODEL.to_string(),
            pacing: Duration::from_millis(postloom_core::config::DEFAULT_PACING_MS),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl GeneratorOptions {
    /// Options taken from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.text_model().to_string(),
            pacing: Duration::from_millis(config.settings.pacing_ms),
            ..Self::default()
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub conversation_id: String,
    pub posts: Vec<GeneratedPost>,
    pub message: String,
}

/// Generates, publishes and records posts
///
/// One generator can serve concurrent runs; it holds only shared handles and
/// immutable settings.
pub struct PostGenerator {
    storage: Storage,
    providers: Arc<ProviderRegistry>,
    topics: Arc<dyn TopicSource>,
    publisher: Arc<dyn Publisher>,
    reddit: RedditSettings,
    options: GeneratorOptions,
}

impl PostGenerator {
    /// Create a generator wired to the real providers, Google Trends with a
    /// Bing News fallback, and Reddit
    ///
    /// # Example
    ///
    /// ```no_run
    /// use postloom_core::{AppConfig, Database, GenerationRequest};
    /// use postloom_generator::PostGenerator;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = AppConfig::load().await?;
    ///     let db = Database::open(config.database_path()?).await?;
    ///     let generator = PostGenerator::new(&db, &config);
    ///
    ///     let outcome = generator
    ///         .generate(&GenerationRequest::new().keyword("rust").tone("Playful"))
    ///         .await?;
    ///     println!("{}", outcome.message);
    ///     Ok(())
    /// }
    /// ```
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        info!(
            "Initializing PostGenerator with model: {}",
            config.text_model()
        );
        Self {
            storage: db.storage(),
            providers: Arc::new(ProviderRegistry::from_config(config)),
            topics: Arc::new(FallbackTopics::trends_then_news()),
            publisher: Arc::new(RedditPublisher::new()),
            reddit: config.reddit.clone(),
            options: GeneratorOptions::from_config(config),
        }
    }

    pub fn with_providers(mut self, providers: Arc<ProviderRegistry>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_topics(mut self, topics: Arc<dyn TopicSource>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_reddit_settings(mut self, reddit: RedditSettings) -> Self {
        self.reddit = reddit;
        self
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Run one generation
    ///
    /// Topics are processed in order. A text-generation failure aborts the
    /// run, leaving posts of earlier topics stored. A publish failure is
    /// recorded on the post and the run continues.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let keyword = request.keyword_trimmed();
        info!(
            "Generation run: keyword={:?}, region={}, tone={}, length={}",
            keyword, request.region, request.tone, request.length
        );

        let topics = self.topics.resolve(keyword, &request.region).await;
        if topics.is_empty() {
            warn!("No topics resolved, aborting run");
            return Err(Error::NoTopicsFound);
        }
        debug!("Resolved {} topics", topics.len());

        let conversation_id = Uuid::new_v4().to_string();
        self.storage
            .create_conversation(
                &conversation_id,
                &format!("Post Generation: {}", keyword.unwrap_or("General")),
                &request.persona,
                &request.tone,
            )
            .await?;

        let intent = format!(
            "Generate posts about: {} in {} with {} tone as {}",
            keyword.unwrap_or("current trends"),
            request.region,
            request.tone,
            request.persona
        );
        let intent_meta = format!("region:{},tone:{}", request.region, request.tone);
        self.storage
            .add_message(&conversation_id, Role::User, &intent, Some(&intent_meta))
            .await?;
        info!("Conversation opened: {}", conversation_id);

        let style_context = StyleContextBuilder::new()
            .sample_limit(self.options.sample_limit)
            .memory_limit(self.options.memory_limit)
            .build(&self.storage, &request.persona, Some(&conversation_id))
            .await?;

        let target = match request.publish_channel() {
            Some(channel) => Some((self.connect_publisher().await?, channel)),
            None => None,
        };

        let pacer = pacing_limiter(self.options.pacing);
        let mut posts = Vec::with_capacity(topics.len());

        for (idx, topic) in topics.iter().enumerate() {
            if let Some(pacer) = &pacer {
                pacer.until_ready().await;
            }
            info!("Topic {}/{}: {}", idx + 1, topics.len(), topic);

            let brief = PostBrief {
                topic,
                tone: &request.tone,
                region: &request.region,
                persona: &request.persona,
            };
            let title = clamp_title(&self.complete(&title_prompt(&style_context, &brief)).await?);
            let body = self
                .complete(&body_prompt(
                    &style_context,
                    &brief,
                    request.length.paragraphs(),
                ))
                .await?;

            self.storage
                .add_message(
                    &conversation_id,
                    Role::Assistant,
                    &format!("Generated post - Title: {}\n\nBody: {}", title, body),
                    Some(&format!("topic:{}", topic)),
                )
                .await?;

            let (link, published) = match &target {
                Some((client, channel)) => publish(client.as_ref(), channel, &title, &body).await,
                None => (SKIPPED_LINK.to_string(), false),
            };

            self.storage
                .log_post(&NewPost {
                    topic: topic.clone(),
                    title: title.clone(),
                    body: body.clone(),
                    region: request.region.clone(),
                    tone: request.tone.clone(),
                    persona: request.persona.clone(),
                    length: request.length,
                    channel: request.channel.clone().unwrap_or_default(),
                    link: link.clone(),
                    published,
                    conversation_id: conversation_id.clone(),
                })
                .await?;

            posts.push(GeneratedPost {
                topic: topic.clone(),
                title,
                body,
                link,
                published,
            });
        }

        self.storage.touch_conversation(&conversation_id).await?;

        let message = format!("Generated {} posts.", posts.len());
        info!("{} (conversation {})", message, conversation_id);
        Ok(GenerationOutcome {
            conversation_id,
            posts,
            message,
        })
    }

    /// Refresh score and comment counts of published posts
    ///
    /// Posts whose lookup fails are skipped.
    pub async fn refresh_engagement(&self) -> Result<String> {
        let client = self.publisher.connect(&self.reddit).await?.ok_or_else(|| {
            Error::PublishAuthFailure("Reddit credentials missing. Add them in Settings.".to_string())
        })?;

        let posts = self.storage.posts_for_refresh().await?;
        info!("Refreshing engagement for {} posts", posts.len());

        let mut updates = Vec::with_capacity(posts.len());
        for (post_id, link) in posts {
            match client.engagement(&link).await {
                Ok((score, comments)) => updates.push((post_id, score, comments)),
                Err(e) => warn!("Skipping engagement for post {}: {}", post_id, e),
            }
        }

        let updated = self.storage.update_metrics(&updates).await?;
        Ok(format!("Updated {} posts.", updated))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        match self.providers.generate(&self.options.model, prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                error!("Text generation failed: {}", e);
                Err(e.into())
            }
        }
    }

    async fn connect_publisher(&self) -> Result<Arc<dyn PublishClient>> {
        match self.publisher.connect(&self.reddit).await {
            Ok(Some(client)) => Ok(client),
            Ok(None) => Err(Error::PublishAuthFailure(
                "Reddit credentials are incomplete. Update them in Settings.".to_string(),
            )),
            Err(e) => {
                error!("Publishing unavailable: {}", e);
                Err(Error::PublishAuthFailure(e.to_string()))
            }
        }
    }
}

/// Submit one post; failures become the stored link text
async fn publish(
    client: &dyn PublishClient,
    channel: &str,
    title: &str,
    body: &str,
) -> (String, bool) {
    match client.submit(channel, title, body).await {
        Ok(url) => {
            info!("Published to {}: {}", channel, url);
            (url, true)
        }
        Err(e) => {
            warn!("Publishing to {} failed: {}", channel, e);
            let failure: String = format!("Post failed: {}", e)
                .chars()
                .take(PUBLISH_FAILURE_LIMIT)
                .collect();
            (failure, false)
        }
    }
}

fn pacing_limiter(period: Duration) -> Option<DefaultDirectRateLimiter> {
    Quota::with_period(period).map(RateLimiter::direct)
}
