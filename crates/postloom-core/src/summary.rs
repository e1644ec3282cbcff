//! Daily summary export

use crate::{Error, HistoryEntry, PostRecord, Result, Storage, SummaryFormat};
use chrono::{DateTime, NaiveDate, Utc};

/// Render the summary for `date` in the requested format
///
/// `txt` lists the posts of that day; `csv` exports the full post table.
pub async fn export_summary(
    storage: &Storage,
    format: SummaryFormat,
    date: NaiveDate,
) -> Result<String> {
    match format {
        SummaryFormat::Txt => {
            let rows = storage.posts_for_date(date).await?;
            Ok(render_text(date, &rows))
        }
        SummaryFormat::Csv => {
            let rows = storage.all_posts().await?;
            render_csv(&rows)
        }
    }
}

/// Plain-text daily summary
pub fn render_text(date: NaiveDate, rows: &[HistoryEntry]) -> String {
    if rows.is_empty() {
        return format!("Daily Summary {}\nNo posts recorded.", date);
    }

    let mut lines = vec![format!("Daily Summary {}", date)];
    for (idx, row) in rows.iter().enumerate() {
        let channel = if row.channel.is_empty() {
            "(no channel)"
        } else {
            row.channel.as_str()
        };
        lines.push(format!(
            "{}. {} -> {}\n{} | {}\n{}\nUpvotes: {} | Comments: {}\n",
            idx + 1,
            row.topic,
            row.title,
            channel,
            format_timestamp(row.timestamp),
            row.link,
            row.upvotes,
            row.comments
        ));
    }
    lines.join("\n")
}

/// CSV export of every stored post
pub fn render_csv(rows: &[PostRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "ID", "Topic", "Title", "Body", "Region", "Tone", "Persona", "Length", "Channel", "Link",
        "Upvotes", "Comments", "Timestamp",
    ])?;

    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.topic.clone(),
            row.title.clone(),
            row.body.clone(),
            row.region.clone(),
            row.tone.clone(),
            row.persona.clone(),
            row.length.clone(),
            row.channel.clone(),
            row.link.clone(),
            row.upvotes.to_string(),
            row.comments.to_string(),
            format_timestamp(row.timestamp),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(format!("CSV is not UTF-8: {}", e)))
}

/// Format a millisecond timestamp as RFC 3339 (UTC)
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}
