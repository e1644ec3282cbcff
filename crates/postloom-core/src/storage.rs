//! Storage operations for conversations, messages and posts

use crate::{
    Conversation, Error, HistoryEntry, MemoryItem, MemoryStats, Message, NewPost, PersonaCount,
    PostRecord, PostStats, Result, Role, StyleSample,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Persistence surface used by a generation run
///
/// Writes are append-only; reads return most-recent-first projections used
/// for personalization.
#[async_trait]
pub trait StorageOperations {
    /// Create a conversation thread
    async fn create_conversation(
        &self,
        id: &str,
        title: &str,
        persona: &str,
        tone: &str,
    ) -> Result<Conversation>;

    /// Append a message to a conversation, returning its row id
    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        metadata: Option<&str>,
    ) -> Result<i64>;

    /// Refresh a conversation's `updated_at`
    async fn touch_conversation(&self, id: &str) -> Result<()>;

    /// Most recent posts with a non-blank body
    async fn style_samples(&self, limit: usize) -> Result<Vec<StyleSample>>;

    /// Most recent assistant messages from conversations with exactly this persona
    async fn memory_context(&self, persona: &str, limit: usize) -> Result<Vec<MemoryItem>>;

    /// Store a generated post, returning its row id
    async fn log_post(&self, post: &NewPost) -> Result<i64>;
}

/// Storage implementation
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new Storage instance
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl StorageOperations for Storage {
    async fn create_conversation(
        &self,
        id: &str,
        title: &str,
        persona: &str,
        tone: &str,
    ) -> Result<Conversation> {
        info!("Creating conversation: {} ({})", id, title);

        let now = now_millis();
        sqlx::query(
            r#"
            INSERT INTO conversations (id, title, persona, tone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(persona)
        .bind(tone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Conversation {
            id: id.to_string(),
            title: title.to_string(),
            persona: persona.to_string(),
            tone: tone.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        metadata: Option<&str>,
    ) -> Result<i64> {
        debug!("Adding {} message to conversation {}", role, conversation_id);

        // Clamp to the latest timestamp already in the thread so ordering never goes backwards.
        let result = sqlx::query(
            r#"
            INSERT INTO messages (conversation_id, role, content, timestamp, metadata)
            SELECT ?, ?, ?, MAX(?, COALESCE(MAX(timestamp), 0)), ?
            FROM messages
            WHERE conversation_id = ?
            "#,
        )
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now_millis())
        .bind(metadata)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn touch_conversation(&self, id: &str) -> Result<()> {
        debug!("Touching conversation: {}", id);

        let result = sqlx::query(
            "UPDATE conversations SET updated_at = MAX(updated_at, ?) WHERE id = ?",
        )
        .bind(now_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ConversationNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn style_samples(&self, limit: usize) -> Result<Vec<StyleSample>> {
        debug!("Fetching {} style samples", limit);

        let samples = sqlx::query_as::<_, StyleSample>(
            r#"
            SELECT title, body, tone, persona
            FROM posts
            WHERE TRIM(body) <> ''
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    async fn memory_context(&self, persona: &str, limit: usize) -> Result<Vec<MemoryItem>> {
        debug!("Fetching memory context for persona: {}", persona);

        // `=` on TEXT uses BINARY collation, so persona matching is case-sensitive.
        let items = sqlx::query_as::<_, MemoryItem>(
            r#"
            SELECT c.title, m.content, m.timestamp
            FROM conversations c
            JOIN messages m ON c.id = m.conversation_id
            WHERE c.persona = ? AND m.role = 'assistant'
            ORDER BY m.timestamp DESC, m.id DESC
            LIMIT ?
            "#,
        )
        .bind(persona)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn log_post(&self, post: &NewPost) -> Result<i64> {
        info!(
            "Logging post for topic '{}' (published: {})",
            post.topic, post.published
        );

        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                topic, title, body, region, tone, persona, length, channel, link, published,
                timestamp, conversation_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.topic)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.region)
        .bind(&post.tone)
        .bind(&post.persona)
        .bind(post.length.as_str())
        .bind(&post.channel)
        .bind(&post.link)
        .bind(post.published)
        .bind(now_millis())
        .bind(&post.conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

impl Storage {
    /// Most recent posts, newest first
    pub async fn recent_posts(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        debug!("Listing {} recent posts", limit);

        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT topic, title, channel, link, upvotes, comments, timestamp
            FROM posts
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Posts created on the given UTC date, newest first
    pub async fn posts_for_date(&self, date: NaiveDate) -> Result<Vec<HistoryEntry>> {
        let (start, end) = day_bounds(date);

        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT topic, title, channel, link, upvotes, comments, timestamp
            FROM posts
            WHERE timestamp >= ? AND timestamp < ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every stored post, newest first
    pub async fn all_posts(&self) -> Result<Vec<PostRecord>> {
        let rows = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT id, topic, title, body, region, tone, persona, length, channel, link,
                   published, upvotes, comments, timestamp, conversation_id
            FROM posts
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Post counters; "today" is the current UTC date
    pub async fn post_stats(&self) -> Result<PostStats> {
        let (start, end) = day_bounds(Utc::now().date_naive());

        let (total_posts, today_posts, published_posts): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN timestamp >= ? AND timestamp < ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN published = 1 THEN 1 ELSE 0 END), 0)
            FROM posts
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(PostStats {
            total_posts,
            today_posts,
            published_posts,
        })
    }

    /// Conversation memory analytics
    pub async fn memory_stats(&self) -> Result<MemoryStats> {
        let week_ago = (Utc::now() - Duration::days(7)).timestamp_millis();

        let (conversations,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        let (messages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        let (recent_activity,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE updated_at >= ?")
                .bind(week_ago)
                .fetch_one(&self.pool)
                .await?;
        let (memory_items,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE role = 'assistant'")
                .fetch_one(&self.pool)
                .await?;

        let top_personas = sqlx::query_as::<_, PersonaCount>(
            r#"
            SELECT persona, COUNT(*) AS count
            FROM conversations
            GROUP BY persona
            ORDER BY count DESC, persona ASC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(MemoryStats {
            conversations,
            messages,
            recent_activity,
            top_personas,
            memory_items,
        })
    }

    /// Most recently active conversations
    pub async fn recent_conversations(&self, limit: usize) -> Result<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, title, persona, tone, created_at, updated_at
            FROM conversations
            ORDER BY updated_at DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a conversation by id
    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let row = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, title, persona, tone, created_at, updated_at
            FROM conversations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Messages of a conversation in the order they were written
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let rows: Vec<(i64, String, String, String, i64, Option<String>)> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, role, content, timestamp, metadata
            FROM messages
            WHERE conversation_id = ?
            ORDER BY timestamp ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(conversation_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, conversation_id, role, content, timestamp, metadata)| {
                Ok(Message {
                    id,
                    conversation_id,
                    role: role.parse()?,
                    content,
                    timestamp,
                    metadata,
                })
            })
            .collect()
    }

    /// Posts whose link points at a Reddit submission
    pub async fn posts_for_refresh(&self) -> Result<Vec<(i64, String)>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, link FROM posts WHERE link LIKE 'https://www.reddit.com%'",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Apply `(post_id, upvotes, comments)` updates in one transaction
    pub async fn update_metrics(&self, updates: &[(i64, i64, i64)]) -> Result<u64> {
        info!("Updating engagement metrics for {} posts", updates.len());

        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for (post_id, upvotes, comments) in updates {
            affected += sqlx::query("UPDATE posts SET upvotes = ?, comments = ? WHERE id = ?")
                .bind(upvotes)
                .bind(comments)
                .bind(post_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        Ok(affected)
    }
}

/// Millisecond bounds `[start, end)` of a UTC day
fn day_bounds(date: NaiveDate) -> (i64, i64) {
    let start = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default();
    (start, start + Duration::days(1).num_milliseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, LengthClass};
    use tempfile::TempDir;

    async fn setup_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path).await.unwrap();
        (db, temp_dir)
    }

    fn sample_post(topic: &str, body: &str) -> NewPost {
        NewPost {
            topic: topic.to_string(),
            title: format!("{} title", topic),
            body: body.to_string(),
            region: "united_states".to_string(),
            tone: "Playful".to_string(),
            persona: "pirate".to_string(),
            length: LengthClass::Short,
            channel: "rust".to_string(),
            link: "[Skipped]".to_string(),
            published: false,
            conversation_id: String::new(),
        }
    }

    #[tokio::test]
    async fn test_conversation_and_messages() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        let conv = storage
            .create_conversation("c1", "Post Generation: rust", "pirate", "Playful")
            .await
            .unwrap();
        assert_eq!(conv.created_at, conv.updated_at);

        storage
            .add_message("c1", Role::User, "intent", Some("region:japan,tone:Playful"))
            .await
            .unwrap();
        storage
            .add_message("c1", Role::Assistant, "first", Some("topic:a"))
            .await
            .unwrap();
        storage
            .add_message("c1", Role::Assistant, "second", None)
            .await
            .unwrap();

        let history = storage.conversation_history("c1", 50).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].metadata.as_deref(), Some("region:japan,tone:Playful"));
        assert_eq!(history[2].content, "second");
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_message_requires_conversation() {
        let (db, _temp) = setup_db().await;
        let result = db
            .storage()
            .add_message("missing", Role::User, "intent", None)
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_touch_conversation() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        let conv = storage
            .create_conversation("c1", "title", "pirate", "Playful")
            .await
            .unwrap();
        storage.touch_conversation("c1").await.unwrap();

        let stored = storage.get_conversation("c1").await.unwrap().unwrap();
        assert!(stored.updated_at >= conv.updated_at);
        assert_eq!(stored.created_at, conv.created_at);

        let missing = storage.touch_conversation("nope").await;
        assert!(matches!(missing, Err(Error::ConversationNotFound(_))));
    }

    #[tokio::test]
    async fn test_style_samples_skip_blank_bodies() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        storage.log_post(&sample_post("old", "old body")).await.unwrap();
        storage.log_post(&sample_post("blank", "   ")).await.unwrap();
        storage.log_post(&sample_post("new", "new body")).await.unwrap();

        let samples = storage.style_samples(5).await.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].body, "new body");
        assert_eq!(samples[1].body, "old body");

        let limited = storage.style_samples(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_context_is_persona_scoped() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        storage
            .create_conversation("c1", "Pirate run", "pirate", "Playful")
            .await
            .unwrap();
        storage
            .create_conversation("c2", "Other run", "Pirate", "Playful")
            .await
            .unwrap();
        storage.add_message("c1", Role::User, "intent", None).await.unwrap();
        storage
            .add_message("c1", Role::Assistant, "arr", None)
            .await
            .unwrap();
        storage
            .add_message("c2", Role::Assistant, "case differs", None)
            .await
            .unwrap();

        let items = storage.memory_context("pirate", 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Pirate run");
        assert_eq!(items[0].content, "arr");
    }

    #[tokio::test]
    async fn test_log_post_round_trips_through_history() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        let mut post = sample_post("Rust 2.0", "body");
        post.link = "https://www.reddit.com/r/rust/comments/abc".to_string();
        post.published = true;
        storage.log_post(&post).await.unwrap();

        let history = storage.recent_posts(50).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].topic, "Rust 2.0");
        assert_eq!(history[0].title, "Rust 2.0 title");
        assert_eq!(history[0].channel, "rust");
        assert_eq!(history[0].link, post.link);

        let all = storage.all_posts().await.unwrap();
        assert_eq!(all[0].timestamp, history[0].timestamp);
        assert!(all[0].published);
        assert_eq!(all[0].length, "Short");

        let today = storage.posts_for_date(Utc::now().date_naive()).await.unwrap();
        assert_eq!(today, history);
    }

    #[tokio::test]
    async fn test_post_stats() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        storage.log_post(&sample_post("a", "body")).await.unwrap();
        let mut published = sample_post("b", "body");
        published.published = true;
        storage.log_post(&published).await.unwrap();

        let stats = storage.post_stats().await.unwrap();
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.today_posts, 2);
        assert_eq!(stats.published_posts, 1);
    }

    #[tokio::test]
    async fn test_memory_stats() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        storage.create_conversation("c1", "t", "pirate", "x").await.unwrap();
        storage.create_conversation("c2", "t", "pirate", "x").await.unwrap();
        storage.create_conversation("c3", "t", "poet", "x").await.unwrap();
        storage.add_message("c1", Role::User, "u", None).await.unwrap();
        storage.add_message("c1", Role::Assistant, "a", None).await.unwrap();

        let stats = storage.memory_stats().await.unwrap();
        assert_eq!(stats.conversations, 3);
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.recent_activity, 3);
        assert_eq!(stats.memory_items, 1);
        assert_eq!(stats.top_personas[0].persona, "pirate");
        assert_eq!(stats.top_personas[0].count, 2);
    }

    #[tokio::test]
    async fn test_refresh_metrics() {
        let (db, _temp) = setup_db().await;
        let storage = db.storage();

        let mut reddit = sample_post("a", "body");
        reddit.link = "https://www.reddit.com/r/rust/comments/xyz".to_string();
        let id = storage.log_post(&reddit).await.unwrap();
        storage.log_post(&sample_post("b", "body")).await.unwrap();

        let candidates = storage.posts_for_refresh().await.unwrap();
        assert_eq!(candidates, vec![(id, reddit.link.clone())]);

        let affected = storage.update_metrics(&[(id, 42, 7)]).await.unwrap();
        assert_eq!(affected, 1);

        let history = storage.recent_posts(10).await.unwrap();
        let entry = history.iter().find(|h| h.topic == "a").unwrap();
        assert_eq!((entry.upvotes, entry.comments), (42, 7));
    }
}
