use crate::types::{AggregatorError, Result};
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use tracing::debug;

/// Parse an RSS or Atom document.
pub fn parse_feed(content: &str) -> Result<Feed> {
    debug!("Parsing feed content ({} bytes)", content.len());

    parser::parse(content.as_bytes())
        .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))
}

pub fn entry_title(entry: &Entry) -> Option<String> {
    entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn entry_summary(entry: &Entry) -> String {
    entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default()
}

/// The `alternate` link when present, otherwise the first link.
pub fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
}

/// Published date, falling back to the updated date.
pub fn entry_timestamp(entry: &Entry) -> Option<DateTime<Utc>> {
    entry.published.or(entry.updated)
}

pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
