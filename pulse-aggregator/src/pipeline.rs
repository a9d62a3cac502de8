use crate::config::PulseConfig;
use crate::history::{self, HISTORY_FILE};
use crate::sources::{ArxivSource, GithubTrendingSource, HuggingFaceSource, RssNewsSource};
use crate::stats::{self, SourceSnapshots, StaticCounts};
use crate::store::SnapshotStore;
use crate::traits::{fallback, SourceAdapter};
use crate::types::{Counts, Result, Stats};
use crate::Fetcher;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

pub const STATS_FILE: &str = "stats.json";

/// Summary of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub counts: Counts,
    pub stats_saved: bool,
    pub history_saved: bool,
    pub elapsed: Duration,
}

/// Runs every source once, then derives stats and history.
pub struct Pipeline {
    config: PulseConfig,
    fetcher: Arc<Fetcher>,
    store: SnapshotStore,
}

impl Pipeline {
    pub fn new(config: PulseConfig) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
        let store = SnapshotStore::new(config.data_dir.clone());
        Ok(Self { config, fetcher, store })
    }

    /// One full pass. Failures are logged, never returned.
    pub async fn run(&self) -> RunReport {
        let start = Instant::now();
        info!("=== AI Daily Pulse run started ===");
        if let Err(e) = self.store.ensure_dir().await {
            error!("Cannot create {}: {}", self.store.dir().display(), e);
        }

        let store = &self.store;
        let papers = collect_isolated(
            ArxivSource::new(self.fetcher.clone(), self.config.arxiv.clone()),
            store,
        )
        .await;
        let models = collect_isolated(
            HuggingFaceSource::new(self.fetcher.clone(), self.config.huggingface.clone()),
            store,
        )
        .await;
        let trending = collect_isolated(
            GithubTrendingSource::new(self.fetcher.clone(), self.config.trending.clone()),
            store,
        )
        .await;
        let news = collect_isolated(
            RssNewsSource::new(self.fetcher.clone(), self.config.news.clone()),
            store,
        )
        .await;

        let sources = SourceSnapshots {
            papers: &papers,
            models: &models,
            trending: &trending,
            news: &news,
        };
        let stats = stats::compute(sources, StaticCounts::load(&self.store).await, Utc::now());

        let stats_saved = match self.store.save(STATS_FILE, &stats).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save stats: {}", e);
                false
            }
        };
        let history_saved = match self.record_history(&stats).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to update history: {}", e);
                false
            }
        };

        let elapsed = start.elapsed();
        info!("=== Run finished in {:.1}s ===", elapsed.as_secs_f64());

        RunReport {
            counts: stats.counts,
            stats_saved,
            history_saved,
            elapsed,
        }
    }

    async fn record_history(&self, stats: &Stats) -> Result<()> {
        let now = Utc::now();
        let history = history::update_history(&self.store, &stats.counts, now.date_naive(), now).await;
        self.store.save(HISTORY_FILE, &history).await
    }
}

/// Collect one source in its own task so that even a panic inside the
/// adapter ends in the degraded fallback instead of aborting the run.
pub async fn collect_isolated<A>(adapter: A, store: &SnapshotStore) -> A::Snapshot
where
    A: SourceAdapter + 'static,
{
    let adapter = Arc::new(adapter);
    let task_adapter = adapter.clone();
    let task_store = store.clone();

    match tokio::spawn(async move { task_adapter.collect(&task_store).await }).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("{}: adapter task failed: {}", adapter.source_name(), e);
            fallback(adapter.as_ref(), store).await
        }
    }
}
