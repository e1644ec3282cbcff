//! Style context built from the user's previous posts and conversations

use crate::Result;
use postloom_core::{MemoryItem, StorageOperations, StyleSample};
use tracing::debug;

/// Default number of past posts sampled
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;
/// Default number of memory items fetched
pub const DEFAULT_MEMORY_LIMIT: usize = 10;
/// Memory items rendered into the context
const MEMORY_RENDER_LIMIT: usize = 3;
/// Maximum excerpt width in characters, marker included
pub const EXCERPT_WIDTH: usize = 340;
const ELLIPSIS: &str = "…";

const PREAMBLE: &str = "Study the user's established Reddit voice and conversation patterns below. \
Match their pacing, formatting, and energy while following new instructions. \
Learn from their conversation history to create more personalized content.\n\n";

/// Builds the style preamble that precedes every prompt of a run
#[derive(Debug, Clone, Copy)]
pub struct StyleContextBuilder {
    sample_limit: usize,
    memory_limit: usize,
}

impl Default for StyleContextBuilder {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl StyleContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    pub fn memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Build the context for `persona` from stored history
    ///
    /// `_conversation_id` is accepted so callers can pass the current run's
    /// conversation; it does not influence retrieval.
    pub async fn build<S>(
        &self,
        storage: &S,
        persona: &str,
        _conversation_id: Option<&str>,
    ) -> Result<String>
    where
        S: StorageOperations + Sync + ?Sized,
    {
        let samples = storage.style_samples(self.sample_limit).await?;
        let memory = storage.memory_context(persona, self.memory_limit).await?;
        debug!(
            "Style context: {} samples, {} memory items for persona '{}'",
            samples.len(),
            memory.len(),
            persona
        );
        Ok(render_style_context(&memory, &samples))
    }
}

/// Render memory items and post samples into a style context
///
/// Returns an empty string when both inputs are empty.
pub fn render_style_context(memory: &[MemoryItem], samples: &[StyleSample]) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if !memory.is_empty() {
        blocks.push("Recent conversation patterns:".to_string());
        for (idx, item) in memory.iter().take(MEMORY_RENDER_LIMIT).enumerate() {
            blocks.push(format!(
                "Memory {}: {}\nExcerpt: {}",
                idx + 1,
                item.title,
                normalize_snippet(&item.content, EXCERPT_WIDTH)
            ));
        }
    }

    if !samples.is_empty() {
        blocks.push("\nPrevious post styles:".to_string());
        for (idx, sample) in samples.iter().enumerate() {
            let tone = if sample.tone.is_empty() {
                "unspecified"
            } else {
                sample.tone.as_str()
            };
            let persona = match sample.persona.trim() {
                "" => "(persona not set)",
                p => p,
            };
            blocks.push(format!(
                "Sample {}\nTone: {} | Persona: {}\nTitle: {}\nExcerpt: {}",
                idx + 1,
                tone,
                persona,
                sample.title,
                normalize_snippet(&sample.body, EXCERPT_WIDTH)
            ));
        }
    }

    if blocks.is_empty() {
        return String::new();
    }

    format!("{}{}", PREAMBLE, blocks.join("\n\n"))
}

/// Collapse whitespace and shorten to `width` characters at a word boundary
///
/// Shortened text ends with `…`, which counts toward `width`. When even the
/// first word does not fit, only `…` remains.
pub fn normalize_snippet(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(ELLIPSIS.chars().count());
    let mut shortened = String::new();
    let mut len = 0;
    for word in collapsed.split(' ') {
        let word_len = word.chars().count();
        let needed = if shortened.is_empty() {
            word_len
        } else {
            len + 1 + word_len
        };
        if needed > budget {
            break;
        }
        if !shortened.is_empty() {
            shortened.push(' ');
        }
        shortened.push_str(word);
        len = needed;
    }

    shortened.push_str(ELLIPSIS);
    shortened
}
