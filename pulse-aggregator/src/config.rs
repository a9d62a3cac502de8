use crate::types::FetchConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ArxivConfig {
    pub api_url: String,
    pub search_query: String,
    pub max_results: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_url: "http://export.arxiv.org/api/query".to_string(),
            search_query: "cat:cs.AI OR cat:cs.CL OR cat:cs.LG".to_string(),
            max_results: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_url: String,
    pub task: String,
    pub limit: usize,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://huggingface.co/api/models".to_string(),
            task: "text-generation".to_string(),
            limit: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendingConfig {
    /// Third-party aggregation API, tried first.
    pub api_url: String,
    /// The canonical trending page, scraped when the API is unusable.
    pub page_url: String,
    pub limit: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.gitterapp.com/repositories?since=daily".to_string(),
            page_url: "https://github.com/trending?since=daily".to_string(),
            limit: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFeed {
    pub name: String,
    pub url: String,
}

impl NewsFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// Processed in this order.
    pub feeds: Vec<NewsFeed>,
    pub max_per_feed: usize,
    /// Cap across all feeds combined.
    pub max_total: usize,
    pub category: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                NewsFeed::new("机器之心", "https://www.jiqizhixin.com/rss"),
                NewsFeed::new("量子位", "https://www.qbitai.com/feed"),
                NewsFeed::new("InfoQ 中文", "https://www.infoq.cn/feed"),
                NewsFeed::new("开源中国", "https://www.oschina.net/news/rss"),
                NewsFeed::new("36氪", "https://36kr.com/feed"),
                NewsFeed::new("OpenAI Blog", "https://openai.com/blog/rss.xml"),
                NewsFeed::new("Hugging Face Blog", "https://huggingface.co/blog/feed.xml"),
            ],
            max_per_feed: 5,
            max_total: 20,
            category: "AI News".to_string(),
        }
    }
}

/// Everything a run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub data_dir: PathBuf,
    pub fetch: FetchConfig,
    pub arxiv: ArxivConfig,
    pub huggingface: HuggingFaceConfig,
    pub trending: TrendingConfig,
    pub news: NewsConfig,
}

impl PulseConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            fetch: FetchConfig::default(),
            arxiv: ArxivConfig::default(),
            huggingface: HuggingFaceConfig::default(),
            trending: TrendingConfig::default(),
            news: NewsConfig::default(),
        }
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self::new("data")
    }
}
