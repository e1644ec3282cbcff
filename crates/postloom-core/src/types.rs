//! Type definitions shared by storage, the generator and the CLI

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Default tone for a generation request
pub const DEFAULT_TONE: &str = "Informative";
/// Default region for a generation request
pub const DEFAULT_REGION: &str = "united_states";
/// Default persona for a generation request
pub const DEFAULT_PERSONA: &str = "your witty social media co-pilot";

/// Target length of a generated post body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum LengthClass {
    /// Three paragraphs
    Short,
    /// Five paragraphs
    #[default]
    Standard,
    /// Seven paragraphs
    Extended,
}

impl LengthClass {
    /// Number of paragraphs requested from the model
    pub fn paragraphs(&self) -> u8 {
        match self {
            LengthClass::Short => 3,
            LengthClass::Standard => 5,
            LengthClass::Extended => 7,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthClass::Short => "Short",
            LengthClass::Standard => "Standard",
            LengthClass::Extended => "Extended",
        }
    }
}

/// Parsing never fails: anything unrecognized becomes `Standard`.
impl FromStr for LengthClass {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(LengthClass::from(s))
    }
}

impl From<&str> for LengthClass {
    fn from(s: &str) -> Self {
        match s {
            "Short" => LengthClass::Short,
            "Extended" => LengthClass::Extended,
            _ => LengthClass::Standard,
        }
    }
}

impl From<String> for LengthClass {
    fn from(s: String) -> Self {
        LengthClass::from(s.as_str())
    }
}

impl fmt::Display for LengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input to one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Keyword filter for topic discovery
    pub keyword: Option<String>,
    /// Tone of voice, e.g. "Informative" or "Playful"
    pub tone: String,
    /// Region identifier, e.g. "united_states"
    pub region: String,
    /// Free-text voice descriptor
    pub persona: String,
    /// Target body length
    pub length: LengthClass,
    /// Channel (subreddit) to publish to
    pub channel: Option<String>,
    /// Publish each post right after it is generated
    pub auto_publish: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            tone: DEFAULT_TONE.to_string(),
            region: DEFAULT_REGION.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            length: LengthClass::default(),
            channel: None,
            auto_publish: false,
        }
    }
}

impl GenerationRequest {
    /// Create a request with default tone, region, persona and length
    pub fn new() -> Self {
        Self::default()
    }

    /// Set keyword
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Set tone
    pub fn tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    /// Set region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set persona
    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Set length class (unknown names fall back to `Standard`)
    pub fn length(mut self, length: impl AsRef<str>) -> Self {
        self.length = LengthClass::from(length.as_ref());
        self
    }

    /// Publish every generated post to `channel`
    pub fn publish_to(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self.auto_publish = true;
        self
    }

    /// Keyword with surrounding whitespace removed, `None` when blank
    pub fn keyword_trimmed(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Channel to publish to, only when publishing was requested and a channel is set
    pub fn publish_channel(&self) -> Option<&str> {
        if !self.auto_publish {
            return None;
        }
        self.channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// One generated post as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub topic: String,
    pub title: String,
    pub body: String,
    /// Published URL, `[Skipped]`, or a publish failure message
    pub link: String,
    pub published: bool,
}

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, crate::Error> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(crate::Error::Other(format!("Invalid message role: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generation run's audit thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub persona: String,
    pub tone: String,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    /// Unix timestamp in milliseconds
    pub updated_at: i64,
}

/// A single entry in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub metadata: Option<String>,
}

/// A post row as written by a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub topic: String,
    pub title: String,
    pub body: String,
    pub region: String,
    pub tone: String,
    pub persona: String,
    pub length: LengthClass,
    pub channel: String,
    pub link: String,
    pub published: bool,
    pub conversation_id: String,
}

/// A stored post, including engagement counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub topic: String,
    pub title: String,
    pub body: String,
    pub region: String,
    pub tone: String,
    pub persona: String,
    pub length: String,
    pub channel: String,
    pub link: String,
    pub published: bool,
    pub upvotes: i64,
    pub comments: i64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub conversation_id: String,
}

/// Post summary shown in history listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub topic: String,
    pub title: String,
    pub channel: String,
    pub link: String,
    pub upvotes: i64,
    pub comments: i64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Past post used to imitate the user's voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StyleSample {
    pub title: String,
    pub body: String,
    pub tone: String,
    pub persona: String,
}

/// Past assistant message for a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemoryItem {
    /// Title of the owning conversation
    pub title: String,
    pub content: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Post counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostStats {
    pub total_posts: i64,
    pub today_posts: i64,
    pub published_posts: i64,
}

/// Persona usage count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonaCount {
    pub persona: String,
    pub count: i64,
}

/// Conversation memory analytics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MemoryStats {
    pub conversations: i64,
    pub messages: i64,
    /// Conversations updated within the last 7 days
    pub recent_activity: i64,
    pub top_personas: Vec<PersonaCount>,
    /// Assistant messages available as memory
    pub memory_items: i64,
}

impl MemoryStats {
    /// Human-readable summary lines
    pub fn insights(&self) -> Vec<String> {
        let top = self
            .top_personas
            .first()
            .map(|p| p.persona.as_str())
            .unwrap_or("None");
        vec![
            format!(
                "You've had {} conversation threads with the AI",
                self.conversations
            ),
            format!("Generated {} messages total", self.messages),
            format!("Most active persona: {}", top),
            format!("AI has {} memory items to learn from", self.memory_items),
        ]
    }
}

/// Output format of the daily summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    Txt,
    Csv,
}

impl FromStr for SummaryFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, crate::Error> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(SummaryFormat::Txt),
            "csv" => Ok(SummaryFormat::Csv),
            _ => Err(crate::Error::UnsupportedOutputFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_class_paragraphs() {
        assert_eq!(LengthClass::from("Short").paragraphs(), 3);
        assert_eq!(LengthClass::from("Standard").paragraphs(), 5);
        assert_eq!(LengthClass::from("Extended").paragraphs(), 7);
        assert_eq!(LengthClass::from("Gigantic").paragraphs(), 5);
        assert_eq!(LengthClass::from(""), LengthClass::Standard);
    }

    #[test]
    fn test_request_deserializes_unknown_length_as_standard() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"keyword":"tea","tone":"Warm","region":"japan","persona":"butler",
                "length":"Gigantic","channel":null,"auto_publish":false}"#,
        )
        .unwrap();
        assert_eq!(request.length, LengthClass::Standard);

        let json = serde_json::to_string(&GenerationRequest::new().length("Short")).unwrap();
        assert!(json.contains(r#""length":"Short""#));
        let back: GenerationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.length, LengthClass::Short);
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new();
        assert_eq!(request.tone, "Informative");
        assert_eq!(request.region, "united_states");
        assert_eq!(request.length, LengthClass::Standard);
        assert!(!request.auto_publish);
    }

    #[test]
    fn test_publish_channel_requires_flag_and_channel() {
        let request = GenerationRequest::new().publish_to("  rust  ");
        assert_eq!(request.publish_channel(), Some("rust"));

        let mut no_flag = request.clone();
        no_flag.auto_publish = false;
        assert_eq!(no_flag.publish_channel(), None);

        let blank = GenerationRequest::new().publish_to("   ");
        assert_eq!(blank.publish_channel(), None);
    }

    #[test]
    fn test_keyword_trimmed() {
        assert_eq!(GenerationRequest::new().keyword(" ai ").keyword_trimmed(), Some("ai"));
        assert_eq!(GenerationRequest::new().keyword("  ").keyword_trimmed(), None);
        assert_eq!(GenerationRequest::new().keyword_trimmed(), None);
    }

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn test_summary_format() {
        assert_eq!(SummaryFormat::from_str("TXT").unwrap(), SummaryFormat::Txt);
        assert_eq!(SummaryFormat::from_str("csv").unwrap(), SummaryFormat::Csv);
        assert!(matches!(
            SummaryFormat::from_str("pdf"),
            Err(crate::Error::UnsupportedOutputFormat(_))
        ));
    }

    #[test]
    fn test_memory_insights() {
        let stats = MemoryStats {
            conversations: 2,
            messages: 7,
            recent_activity: 1,
            top_personas: vec![PersonaCount {
                persona: "pirate".to_string(),
                count: 2,
            }],
            memory_items: 5,
        };
        let insights = stats.insights();
        assert_eq!(insights.len(), 4);
        assert_eq!(insights[2], "Most active persona: pirate");
        assert_eq!(MemoryStats::default().insights()[2], "Most active persona: None");
    }
}
