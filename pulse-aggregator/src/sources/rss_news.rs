use crate::config::{NewsConfig, NewsFeed};
use crate::parser::{self, entry_link, entry_summary, entry_timestamp, entry_title};
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, Article, NewsSnapshot, Parsed, Result};
use crate::utils::text::{mark_english_title, strip_html, truncate_chars};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use feed_rs::model::Entry;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_SUMMARY_CHARS: usize = 300;

/// AI news from a fixed, ordered list of RSS/Atom feeds.
pub struct RssNewsSource {
    fetcher: Arc<Fetcher>,
    config: NewsConfig,
}

impl RssNewsSource {
    pub fn new(fetcher: Arc<Fetcher>, config: NewsConfig) -> Self {
        Self { fetcher, config }
    }

    async fn fetch_feed(&self, feed: &NewsFeed, today: NaiveDate) -> Option<Vec<Article>> {
        let body = match self.fetcher.fetch(&feed.url, &[], None).await {
            Some(body) => body,
            None => {
                warn!("RSS feed unavailable: {}", feed.name);
                return None;
            }
        };

        match parse_articles(&body, feed, &self.config, today) {
            Ok(parsed) => {
                parsed.log_issues(&feed.name);
                info!("  {}: {} articles", feed.name, parsed.records.len());
                Some(parsed.into_records())
            }
            Err(e) => {
                warn!("RSS feed {} is unreadable: {}", feed.name, e);
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for RssNewsSource {
    type Snapshot = NewsSnapshot;

    fn source_name(&self) -> &'static str {
        "RSS News"
    }

    /// `rss_news.json` is the legacy name, `ai_news.json` the current one.
    fn files(&self) -> &'static [&'static str] {
        &["rss_news.json", "ai_news.json"]
    }

    async fn acquire(&self) -> Result<Option<NewsSnapshot>> {
        info!("Fetching RSS news from {} feeds", self.config.feeds.len());

        let today = Utc::now().date_naive();
        let mut articles = Vec::new();
        let mut reachable = 0;

        for feed in &self.config.feeds {
            if let Some(mut feed_articles) = self.fetch_feed(feed, today).await {
                reachable += 1;
                articles.append(&mut feed_articles);
            }
        }

        if reachable == 0 && !self.config.feeds.is_empty() {
            return Ok(None);
        }

        info!("RSS: {} articles collected from {} feeds", articles.len(), reachable);
        Ok(Some(NewsSnapshot {
            updated: Utc::now(),
            articles: latest_articles(articles, self.config.max_total),
        }))
    }
}

/// Parse one feed, keeping at most `config.max_per_feed` entries.
pub fn parse_articles(
    content: &str,
    feed: &NewsFeed,
    config: &NewsConfig,
    today: NaiveDate,
) -> Result<Parsed<Article>> {
    let parsed = parser::parse_feed(content)?;
    Ok(Parsed::from_results(
        parsed
            .entries
            .iter()
            .take(config.max_per_feed)
            .map(|entry| parse_article(entry, feed, &config.category, today)),
    ))
}

fn parse_article(entry: &Entry, feed: &NewsFeed, category: &str, today: NaiveDate) -> Result<Article> {
    let title = entry_title(entry)
        .ok_or_else(|| AggregatorError::Parse(format!("entry '{}' has no title", entry.id)))?;

    let published = entry_timestamp(entry)
        .map(parser::format_date)
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    Ok(Article {
        title: mark_english_title(&title),
        source: feed.name.clone(),
        published,
        summary: truncate_chars(&strip_html(&entry_summary(entry)), MAX_SUMMARY_CHARS),
        link: entry_link(entry).unwrap_or_default(),
        category: category.to_string(),
    })
}

/// Newest first by ISO date, then capped across all feeds. The sort is
/// stable, so same-day articles keep feed order.
pub fn latest_articles(mut articles: Vec<Article>, max_total: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.published.cmp(&a.published));
    articles.truncate(max_total);
    articles
}
