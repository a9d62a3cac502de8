use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A research paper from the arXiv listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: String,
    pub link: String,
    pub categories: Vec<String>,
}

/// A trending model from the Hugging Face registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub author: String,
    pub downloads: u64,
    pub likes: u64,
    pub tags: Vec<String>,
    pub link: String,
    pub updated: String,
}

/// A trending GitHub repository. Both acquisition tiers produce this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub stars_today: u64,
    /// Empty when the language is unknown.
    pub language: String,
    pub link: String,
}

/// A news article from one of the configured feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: String,
    pub published: String,
    pub summary: String,
    pub link: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PapersSnapshot {
    pub updated: DateTime<Utc>,
    pub papers: Vec<Paper>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsSnapshot {
    pub updated: DateTime<Utc>,
    pub models: Vec<Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingSnapshot {
    pub updated: DateTime<Utc>,
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSnapshot {
    pub updated: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// The six categories whose daily counts feed the rolling history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedSource {
    Arxiv,
    HuggingFace,
    GithubTrending,
    RssNews,
    AiTools,
    DevTips,
}

impl TrackedSource {
    pub const ALL: [TrackedSource; 6] = [
        TrackedSource::Arxiv,
        TrackedSource::HuggingFace,
        TrackedSource::GithubTrending,
        TrackedSource::RssNews,
        TrackedSource::AiTools,
        TrackedSource::DevTips,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TrackedSource::Arxiv => "arxiv",
            TrackedSource::HuggingFace => "huggingface",
            TrackedSource::GithubTrending => "github_trending",
            TrackedSource::RssNews => "rss_news",
            TrackedSource::AiTools => "ai_tools",
            TrackedSource::DevTips => "dev_tips",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counts {
    pub arxiv: usize,
    pub huggingface: usize,
    pub github_trending: usize,
    pub rss_news: usize,
    pub ai_tools: usize,
    pub dev_tips: usize,
}

impl Counts {
    pub fn get(&self, source: TrackedSource) -> usize {
        match source {
            TrackedSource::Arxiv => self.arxiv,
            TrackedSource::HuggingFace => self.huggingface,
            TrackedSource::GithubTrending => self.github_trending,
            TrackedSource::RssNews => self.rss_news,
            TrackedSource::AiTools => self.ai_tools,
            TrackedSource::DevTips => self.dev_tips,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub updated: DateTime<Utc>,
    pub counts: Counts,
    pub top_tags: Vec<TagCount>,
    pub top_languages: Vec<LanguageCount>,
}

/// A record that could not be parsed. Non-fatal: the record is dropped.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a best-effort batch parse: the records that parsed plus
/// diagnostics for the ones that did not.
#[derive(Debug)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub issues: Vec<ParseIssue>,
}

impl<T> Parsed<T> {
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T>>,
    {
        let mut records = Vec::new();
        let mut issues = Vec::new();

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => issues.push(ParseIssue {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        Self { records, issues }
    }

    pub fn log_issues(&self, source: &str) {
        for issue in &self.issues {
            warn!("Skipping {} record #{}: {}", source, issue.index, issue.reason);
        }
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Used for targets that block non-browser clients.
    pub browser_user_agent: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "AI-Daily-Pulse/1.0".to_string(),
            browser_user_agent: "Mozilla/5.0 (compatible; AI-Daily-Pulse/1.0)".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            retry_delay_seconds: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
