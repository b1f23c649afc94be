use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Persisted extraction settings.
///
/// Every field carries a default so that a settings file written by an older
/// version (or missing entirely) still deserializes; absent keys get their
/// defaults applied per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Start extraction automatically when a review center page loads
    pub auto_extract: bool,

    /// Cap on the number of URLs one session will collect
    pub max_urls: usize,

    /// Settle delay between UI interactions, in milliseconds
    pub delay: u64,

    /// Attempts when waiting for the console UI to become ready
    pub retry_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self { auto_extract: false, max_urls: 1000, delay: 200, retry_attempts: 3 }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// A missing or unreadable file falls back to full defaults; a partial
    /// file gets defaults for its missing keys. Never fails.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("settings file {} unparseable ({}), using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The settle delay as a Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }
}
