use crate::error::{ExtractorError, Result};
use crate::session::SessionSnapshot;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retention window for persisted snapshots
pub const RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Directory-backed persistence for stopped-session snapshots.
///
/// One JSON file per session, named by session id. Purging is driven by the
/// `started_at` embedded in each snapshot, not by filesystem timestamps.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| ExtractorError::StoreFailed(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The store's directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one session snapshot
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let path = self.path_for(snapshot);
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)
            .map_err(|e| ExtractorError::StoreFailed(format!("cannot write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Load every readable snapshot in the store.
    ///
    /// Unreadable or foreign files are skipped with a log line, not errors.
    pub fn load_all(&self) -> Result<Vec<SessionSnapshot>> {
        let mut snapshots = Vec::new();

        for entry in std::fs::read_dir(&self.dir)
            .map_err(|e| ExtractorError::StoreFailed(format!("cannot read {}: {}", self.dir.display(), e)))?
        {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match std::fs::read_to_string(&path).map_err(ExtractorError::from).and_then(|contents| {
                serde_json::from_str::<SessionSnapshot>(&contents).map_err(ExtractorError::from)
            }) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => log::debug!("skipping unreadable snapshot {}: {}", path.display(), e),
            }
        }

        snapshots.sort_by_key(|s| s.started_at);
        Ok(snapshots)
    }

    /// Remove snapshots older than [`RETENTION`]. Returns how many were purged.
    pub fn purge_expired(&self) -> Result<usize> {
        self.purge_older_than(RETENTION)
    }

    /// Remove snapshots whose session started more than `max_age` ago
    pub fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        let mut purged = 0;

        for snapshot in self.load_all()? {
            let age = (Utc::now() - snapshot.started_at).to_std().unwrap_or_default();
            if age > max_age {
                let path = self.dir.join(format!("session-{}.json", snapshot.id));
                match std::fs::remove_file(&path) {
                    Ok(()) => purged += 1,
                    Err(e) => log::warn!("cannot remove {}: {}", path.display(), e),
                }
            }
        }

        Ok(purged)
    }

    fn path_for(&self, snapshot: &SessionSnapshot) -> PathBuf {
        self.dir.join(format!("session-{}.json", snapshot.id))
    }
}
