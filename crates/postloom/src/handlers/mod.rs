//! Command handlers

pub mod config;
pub mod conversations;
pub mod gen;
pub mod history;
pub mod stats;
pub mod summary;

use chrono::{DateTime, Utc};
use sen::CliError;

/// Map a storage error, keeping configuration and input problems as user errors
pub(crate) fn core_error(context: &str, e: postloom_core::Error) -> CliError {
    match e {
        postloom_core::Error::Config(_)
        | postloom_core::Error::UnsupportedOutputFormat(_)
        | postloom_core::Error::ConversationNotFound(_) => CliError::user(e.to_string()),
        _ => CliError::system(format!("{}: {}", context, e)),
    }
}

/// Map a generation error; the message is passed through unchanged
pub(crate) fn generator_error(e: postloom_generator::Error) -> CliError {
    if e.is_user_error() {
        CliError::user(e.to_string())
    } else {
        CliError::system(e.to_string())
    }
}

pub(crate) fn format_timestamp(millis: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(Utc::now);
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Shorten to `max` characters, marking the cut with `...`
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
        assert_eq!(truncate("日本語のタイトルです", 6), "日本語...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13 UTC");
    }
}
