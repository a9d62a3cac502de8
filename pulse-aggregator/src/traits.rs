use crate::store::SnapshotStore;
use crate::types::{
    ModelsSnapshot, NewsSnapshot, PapersSnapshot, Result, TrendingSnapshot,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};

/// A timestamped, fully-replacing capture of one source's records.
pub trait SnapshotDoc: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// A snapshot with no records, stamped with `updated`.
    fn empty(updated: DateTime<Utc>) -> Self;

    fn updated(&self) -> DateTime<Utc>;

    /// Number of records held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source that turns an external response into a normalized snapshot.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    type Snapshot: SnapshotDoc;

    /// Human-readable name for logs.
    fn source_name(&self) -> &'static str;

    /// Files the snapshot is persisted under. The first one is canonical
    /// and is the one read back for the degraded fallback.
    fn files(&self) -> &'static [&'static str];

    /// Fetch and parse a fresh snapshot.
    ///
    /// `Ok(None)` means the source was unreachable after retries.
    async fn acquire(&self) -> Result<Option<Self::Snapshot>>;

    /// Acquire a snapshot, falling back to the last persisted one when the
    /// source is unavailable or the adapter fails. Never comes back empty-handed.
    async fn collect(&self, store: &SnapshotStore) -> Self::Snapshot {
        match self.acquire().await {
            Ok(Some(snapshot)) => {
                info!("{}: acquired {} records", self.source_name(), snapshot.len());
                if let Err(e) = store.save_all(self.files(), &snapshot).await {
                    error!("{}: failed to persist snapshot: {}", self.source_name(), e);
                }
                snapshot
            }
            Ok(None) => {
                warn!("{}: source unavailable, using last snapshot", self.source_name());
                fallback(self, store).await
            }
            Err(e) => {
                error!("{}: acquisition failed: {}", self.source_name(), e);
                fallback(self, store).await
            }
        }
    }
}

/// Last persisted snapshot for `adapter`, or a fresh empty one which is
/// persisted so consumers always find the file.
pub async fn fallback<A>(adapter: &A, store: &SnapshotStore) -> A::Snapshot
where
    A: SourceAdapter + ?Sized,
{
    let files = adapter.files();
    if let Some(name) = files.first() {
        if let Some(previous) = store.load::<A::Snapshot>(name).await {
            info!(
                "{}: reusing snapshot from {} ({} records)",
                adapter.source_name(),
                previous.updated(),
                previous.len()
            );
            return previous;
        }
    }

    let empty = A::Snapshot::empty(Utc::now());
    if let Err(e) = store.save_all(files, &empty).await {
        error!("{}: failed to persist empty snapshot: {}", adapter.source_name(), e);
    }
    empty
}

impl SnapshotDoc for PapersSnapshot {
    fn empty(updated: DateTime<Utc>) -> Self {
        Self { updated, papers: Vec::new() }
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    fn len(&self) -> usize {
        self.papers.len()
    }
}

impl SnapshotDoc for ModelsSnapshot {
    fn empty(updated: DateTime<Utc>) -> Self {
        Self { updated, models: Vec::new() }
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    fn len(&self) -> usize {
        self.models.len()
    }
}

impl SnapshotDoc for TrendingSnapshot {
    fn empty(updated: DateTime<Utc>) -> Self {
        Self { updated, repositories: Vec::new() }
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    fn len(&self) -> usize {
        self.repositories.len()
    }
}

impl SnapshotDoc for NewsSnapshot {
    fn empty(updated: DateTime<Utc>) -> Self {
        Self { updated, articles: Vec::new() }
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    fn len(&self) -> usize {
        self.articles.len()
    }
}
