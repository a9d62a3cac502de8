use crate::config::ArxivConfig;
use crate::parser::{self, entry_link, entry_timestamp, entry_title};
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, Paper, PapersSnapshot, Parsed, Result};
use crate::utils::text::{single_line, truncate_chars};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Entry;
use std::sync::Arc;
use tracing::info;

const MAX_AUTHORS: usize = 5;
const MAX_SUMMARY_CHARS: usize = 300;

/// Latest submissions from the arXiv search API.
pub struct ArxivSource {
    fetcher: Arc<Fetcher>,
    config: ArxivConfig,
}

impl ArxivSource {
    pub fn new(fetcher: Arc<Fetcher>, config: ArxivConfig) -> Self {
        Self { fetcher, config }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search_query", self.config.search_query.clone()),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
            ("max_results", self.config.max_results.to_string()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for ArxivSource {
    type Snapshot = PapersSnapshot;

    fn source_name(&self) -> &'static str {
        "arXiv"
    }

    fn files(&self) -> &'static [&'static str] {
        &["arxiv.json"]
    }

    async fn acquire(&self) -> Result<Option<PapersSnapshot>> {
        info!("Fetching arXiv papers");

        let body = match self.fetcher.fetch(&self.config.api_url, &self.query(), None).await {
            Some(body) => body,
            None => return Ok(None),
        };

        let parsed = parse_papers(&body)?;
        parsed.log_issues(self.source_name());

        Ok(Some(PapersSnapshot {
            updated: Utc::now(),
            papers: parsed.into_records(),
        }))
    }
}

/// Parse an arXiv Atom response. A malformed document is an error; a
/// malformed entry is only skipped.
pub fn parse_papers(content: &str) -> Result<Parsed<Paper>> {
    let feed = parser::parse_feed(content)?;
    Ok(Parsed::from_results(feed.entries.iter().map(parse_paper)))
}

fn parse_paper(entry: &Entry) -> Result<Paper> {
    let id = paper_id(&entry.id)
        .ok_or_else(|| AggregatorError::Parse(format!("no arXiv identifier in '{}'", entry.id)))?;
    let title = entry_title(entry)
        .map(|t| single_line(&t))
        .ok_or_else(|| AggregatorError::Parse(format!("paper {} has no title", id)))?;

    let summary = entry
        .summary
        .as_ref()
        .map(|s| truncate_chars(&single_line(&s.content), MAX_SUMMARY_CHARS))
        .unwrap_or_default();

    Ok(Paper {
        id,
        title,
        authors: entry
            .authors
            .iter()
            .take(MAX_AUTHORS)
            .map(|a| a.name.trim().to_string())
            .collect(),
        summary,
        published: entry_timestamp(entry)
            .map(parser::format_date)
            .unwrap_or_default(),
        link: entry_link(entry).unwrap_or_default(),
        categories: entry.categories.iter().map(|c| c.term.clone()).collect(),
    })
}

/// `http://arxiv.org/abs/2401.01234v1` -> `2401.01234v1`
pub fn paper_id(canonical_url: &str) -> Option<String> {
    let id = match canonical_url.rsplit_once("/abs/") {
        Some((_, id)) => id,
        None => canonical_url,
    };
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}
