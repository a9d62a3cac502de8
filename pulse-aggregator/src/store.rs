use crate::types::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Named JSON documents in a single directory.
///
/// Every write replaces the whole file through a temp file and a rename,
/// so readers never observe a partially-written document.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Load a document. Missing, unreadable and malformed files all read as `None`.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.path(name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored document at {}", path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed document {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        self.save_all(&[name], value).await
    }

    /// Serialize once and write the same bytes under every name.
    ///
    /// Every temp file is written before any of them is renamed into place,
    /// so a failed write leaves all names at their previous contents.
    pub async fn save_all<T: Serialize + ?Sized>(&self, names: &[&str], value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(names.len());
        for name in names {
            let path = self.path(name);
            match write_temp(&path, &content).await {
                Ok(tmp_path) => staged.push((tmp_path, path)),
                Err(e) => {
                    discard(&staged).await;
                    return Err(e);
                }
            }
        }

        for (i, (tmp_path, path)) in staged.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(tmp_path, path).await {
                if i > 0 {
                    error!(
                        "{} was not replaced; it now differs from {}",
                        path.display(),
                        staged[0].1.display()
                    );
                }
                discard(&staged[i..]).await;
                return Err(e.into());
            }
            info!("Saved {}", path.display());
        }
        Ok(())
    }

    /// Length of the array under `key` in document `name`; 0 when either is absent.
    pub async fn count_items(&self, name: &str, key: &str) -> usize {
        self.load::<serde_json::Value>(name)
            .await
            .and_then(|doc| doc.get(key).and_then(|v| v.as_array()).map(Vec::len))
            .unwrap_or(0)
    }
}

/// Write `content` next to `path` under a unique temp name and return that name.
async fn write_temp(path: &Path, content: &str) -> Result<PathBuf> {
    let tmp_path = path.with_extension(format!("tmp.{}", Uuid::new_v4().simple()));
    if let Err(e) = tokio::fs::write(&tmp_path, content.as_bytes()).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(tmp_path)
}

async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp_path, _) in staged {
        if let Err(e) = tokio::fs::remove_file(tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), e);
        }
    }
}
