use chrono::{DateTime, Utc};
use html2text::render::text_renderer::TrivialDecorator;
use tracing::debug;

use crate::models::Article;

/// Publication time as the feed delivered it. `feed-rs` always yields
/// `Parsed`; `Text` is for producers that hand over the raw date string.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    Parsed(DateTime<Utc>),
    Text(String),
}

/// An entry as it comes out of a feed, every field optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub source: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<RawTimestamp>,
}

/// Convert a raw entry into an `Article`.
///
/// Returns `None` when the title or link is missing/blank or the timestamp
/// text cannot be parsed. A missing timestamp becomes `now`.
pub fn normalize(raw: &RawEntry, now: DateTime<Utc>) -> Option<Article> {
    let title = non_empty(raw.title.as_deref())?;
    let link = non_empty(raw.link.as_deref())?;

    let published_at = match &raw.published {
        None => now,
        Some(RawTimestamp::Parsed(dt)) => *dt,
        Some(RawTimestamp::Text(text)) => parse_timestamp(text)?,
    };

    let excerpt = raw
        .summary
        .as_deref()
        .map(clean_excerpt)
        .unwrap_or_default();

    Some(Article::new(
        title,
        raw.source.trim(),
        published_at,
        link,
        excerpt,
    ))
}

/// Normalize a batch, dropping invalid entries and keeping order
pub fn normalize_all(entries: &[RawEntry], now: DateTime<Utc>) -> Vec<Article> {
    let articles: Vec<Article> = entries.iter().filter_map(|e| normalize(e, now)).collect();

    let dropped = entries.len() - articles.len();
    if dropped > 0 {
        debug!(dropped, kept = articles.len(), "normalizer dropped malformed entries");
    }

    articles
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn clean_excerpt(summary: &str) -> String {
    // Link targets must not end up in the text keyword rules see
    let text = if summary.contains('<') {
        html2text::from_read_with_decorator(
            summary.as_bytes(),
            10_000,
            TrivialDecorator::new(),
        )
    } else {
        summary.to_string()
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
