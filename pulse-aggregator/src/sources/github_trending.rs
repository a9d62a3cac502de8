use crate::config::TrendingConfig;
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, Parsed, Repository, Result, TrendingSnapshot};
use crate::utils::text::{parse_count, truncate_chars};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_DESCRIPTION_CHARS: usize = 200;

/// Ways of getting the trending list, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Third-party JSON API. Fast, but unofficial.
    Api,
    /// Scrape of the trending page itself.
    Page,
}

impl Tier {
    pub const ORDER: [Tier; 2] = [Tier::Api, Tier::Page];
}

/// Daily trending repositories across all languages.
pub struct GithubTrendingSource {
    fetcher: Arc<Fetcher>,
    config: TrendingConfig,
}

impl GithubTrendingSource {
    pub fn new(fetcher: Arc<Fetcher>, config: TrendingConfig) -> Self {
        Self { fetcher, config }
    }

    /// Repositories from one tier; `None` when the tier is unusable.
    async fn try_tier(&self, tier: Tier) -> Option<Vec<Repository>> {
        let parsed = match tier {
            Tier::Api => {
                let body = self.fetcher.fetch(&self.config.api_url, &[], None).await?;
                parse_api_response(&body, self.config.limit)
            }
            Tier::Page => {
                let headers = self.fetcher.browser_headers();
                let body = self
                    .fetcher
                    .fetch(&self.config.page_url, &[], Some(headers))
                    .await?;
                parse_trending_page(&body, self.config.limit)
            }
        };

        match parsed {
            Ok(parsed) => {
                parsed.log_issues(self.source_name());
                Some(parsed.into_records())
            }
            Err(e) => {
                warn!("GitHub Trending {:?} response unusable: {}", tier, e);
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for GithubTrendingSource {
    type Snapshot = TrendingSnapshot;

    fn source_name(&self) -> &'static str {
        "GitHub Trending"
    }

    fn files(&self) -> &'static [&'static str] {
        &["github_trending.json"]
    }

    async fn acquire(&self) -> Result<Option<TrendingSnapshot>> {
        info!("Fetching GitHub Trending");

        for tier in Tier::ORDER {
            match self.try_tier(tier).await {
                Some(repositories) if !repositories.is_empty() => {
                    info!("GitHub Trending: {} repositories via {:?}", repositories.len(), tier);
                    return Ok(Some(TrendingSnapshot {
                        updated: Utc::now(),
                        repositories,
                    }));
                }
                Some(_) => warn!("GitHub Trending {:?} returned no repositories", tier),
                None => {}
            }
        }

        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct RawTrendingRepo {
    #[serde(default)]
    fullname: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stars: Value,
    #[serde(default, rename = "currentPeriodStars")]
    current_period_stars: Value,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Parse the aggregation API's JSON array, keeping at most `limit` entries.
pub fn parse_api_response(content: &str, limit: usize) -> Result<Parsed<Repository>> {
    let items: Vec<Value> = serde_json::from_str(content)?;
    Ok(Parsed::from_results(
        items.into_iter().take(limit).map(parse_api_repo),
    ))
}

fn parse_api_repo(item: Value) -> Result<Repository> {
    let raw: RawTrendingRepo = serde_json::from_value(item)?;
    let name = raw
        .fullname
        .or(raw.name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AggregatorError::Parse("repository has no name".to_string()))?;

    Ok(Repository {
        description: truncate_chars(raw.description.as_deref().unwrap_or(""), MAX_DESCRIPTION_CHARS),
        stars: count_value(&raw.stars),
        stars_today: count_value(&raw.current_period_stars),
        language: raw.language.unwrap_or_default(),
        link: raw
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://github.com/{}", name)),
        name,
    })
}

/// A count that may arrive as a number or as text such as `"1,234"`.
fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => parse_count(s),
        _ => 0,
    }
}

struct PageSelectors {
    entry: Selector,
    title_link: Selector,
    description: Selector,
    language: Selector,
    stars: Selector,
    stars_today: Selector,
}

impl PageSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            entry: selector("article.Box-row")?,
            title_link: selector("h2.h3 a")?,
            description: selector("p.col-9")?,
            language: selector("[itemprop='programmingLanguage']")?,
            stars: selector("a.Link--muted")?,
            stars_today: selector("span.d-inline-block.float-sm-right")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| AggregatorError::Parse(format!("bad selector '{}': {:?}", css, e)))
}

/// Scrape the trending page, keeping at most `limit` entries.
pub fn parse_trending_page(html: &str, limit: usize) -> Result<Parsed<Repository>> {
    let selectors = PageSelectors::new()?;
    let document = Html::parse_document(html);

    Ok(Parsed::from_results(
        document
            .select(&selectors.entry)
            .take(limit)
            .map(|article| parse_page_entry(article, &selectors)),
    ))
}

fn parse_page_entry(article: ElementRef<'_>, selectors: &PageSelectors) -> Result<Repository> {
    let name = article
        .select(&selectors.title_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().trim_matches('/').to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AggregatorError::Parse("trending entry has no repository link".to_string()))?;

    let first_text = |sel: &Selector| {
        article
            .select(sel)
            .next()
            .map(element_text)
            .unwrap_or_default()
    };

    let description = first_text(&selectors.description);
    let stars_today = first_text(&selectors.stars_today);

    Ok(Repository {
        description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
        stars: parse_count(&first_text(&selectors.stars)),
        stars_today: stars_today.split_whitespace().next().map(parse_count).unwrap_or(0),
        language: first_text(&selectors.language),
        link: format!("https://github.com/{}", name),
        name,
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
