pub mod arxiv;
pub mod github_trending;
pub mod huggingface;
pub mod rss_news;

pub use arxiv::ArxivSource;
pub use github_trending::GithubTrendingSource;
pub use huggingface::HuggingFaceSource;
pub use rss_news::RssNewsSource;
