use crate::store::SnapshotStore;
use crate::types::{Counts, TrackedSource};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const HISTORY_FILE: &str = "history.json";

/// Number of calendar days kept in the rolling window.
pub const WINDOW_DAYS: usize = 7;

/// Rolling daily counts. Every series is index-aligned with `dates`.
///
/// Fields missing from an older file deserialize as empty and are
/// zero-filled by [`History::migrate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub arxiv: Vec<usize>,
    #[serde(default)]
    pub huggingface: Vec<usize>,
    #[serde(default)]
    pub github_trending: Vec<usize>,
    #[serde(default)]
    pub rss_news: Vec<usize>,
    #[serde(default)]
    pub ai_tools: Vec<usize>,
    #[serde(default)]
    pub dev_tips: Vec<usize>,
}

impl History {
    pub fn new(updated: DateTime<Utc>) -> Self {
        Self {
            updated,
            dates: Vec::new(),
            arxiv: Vec::new(),
            huggingface: Vec::new(),
            github_trending: Vec::new(),
            rss_news: Vec::new(),
            ai_tools: Vec::new(),
            dev_tips: Vec::new(),
        }
    }

    pub fn series(&self, source: TrackedSource) -> &[usize] {
        match source {
            TrackedSource::Arxiv => &self.arxiv,
            TrackedSource::HuggingFace => &self.huggingface,
            TrackedSource::GithubTrending => &self.github_trending,
            TrackedSource::RssNews => &self.rss_news,
            TrackedSource::AiTools => &self.ai_tools,
            TrackedSource::DevTips => &self.dev_tips,
        }
    }

    fn series_mut(&mut self, source: TrackedSource) -> &mut Vec<usize> {
        match source {
            TrackedSource::Arxiv => &mut self.arxiv,
            TrackedSource::HuggingFace => &mut self.huggingface,
            TrackedSource::GithubTrending => &mut self.github_trending,
            TrackedSource::RssNews => &mut self.rss_news,
            TrackedSource::AiTools => &mut self.ai_tools,
            TrackedSource::DevTips => &mut self.dev_tips,
        }
    }

    /// True when every series has exactly as many entries as `dates`.
    pub fn is_aligned(&self) -> bool {
        TrackedSource::ALL
            .iter()
            .all(|&source| self.series(source).len() == self.dates.len())
    }

    /// Bring a freshly loaded record up to the current schema.
    ///
    /// Short series (including ones absent from the file) are left-padded
    /// with zeros, so only the newest positions carry real counts. Long
    /// series keep their most recent values.
    pub fn migrate(&mut self) {
        let len = self.dates.len();
        for source in TrackedSource::ALL {
            let series = self.series_mut(source);
            if series.len() < len {
                debug!("Backfilling {} history with {} zeros", source.key(), len - series.len());
                let mut padded = vec![0; len - series.len()];
                padded.append(series);
                *series = padded;
            } else if series.len() > len {
                let excess = series.len() - len;
                series.drain(..excess);
            }
        }
    }

    /// Record `counts` for `today`: overwrite if the day is already present,
    /// append otherwise, then trim to the rolling window.
    pub fn upsert(&mut self, today: NaiveDate, counts: &Counts, updated: DateTime<Utc>) {
        if !self.is_aligned() {
            self.migrate();
        }
        let day = today.format("%Y-%m-%d").to_string();

        match self.dates.iter().position(|d| *d == day) {
            Some(idx) => {
                for source in TrackedSource::ALL {
                    self.series_mut(source)[idx] = counts.get(source);
                }
            }
            None => {
                self.dates.push(day);
                for source in TrackedSource::ALL {
                    self.series_mut(source).push(counts.get(source));
                }
            }
        }

        self.trim();
        self.updated = updated;
    }

    /// Keep the last [`WINDOW_DAYS`] entries of every sequence.
    pub fn trim(&mut self) {
        if self.dates.len() <= WINDOW_DAYS {
            return;
        }
        let excess = self.dates.len() - WINDOW_DAYS;
        self.dates.drain(..excess);
        for source in TrackedSource::ALL {
            let series = self.series_mut(source);
            let drop = series.len().saturating_sub(WINDOW_DAYS);
            series.drain(..drop);
        }
    }
}

/// Load the stored history (migrated to the current schema) or start a new one.
pub async fn load_history(store: &SnapshotStore, now: DateTime<Utc>) -> History {
    match store.load::<History>(HISTORY_FILE).await {
        Some(mut history) => {
            history.migrate();
            history
        }
        None => {
            info!("No usable history, starting a new one");
            History::new(now)
        }
    }
}

/// Fold today's counts into the stored history and return the result.
pub async fn update_history(
    store: &SnapshotStore,
    counts: &Counts,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> History {
    let mut history = load_history(store, now).await;
    history.upsert(today, counts, now);
    info!("History now covers {} days", history.dates.len());
    history
}
