//! Session lifecycle and result aggregation
//!
//! The manager owns every session and its result set exclusively; collectors
//! and the driver are stateless and feed results in through [`SessionManager::add_urls`].
//! Sessions are keyed by a page key (one tab/page per key) so concurrent
//! extraction against independent pages cannot cross-contaminate. Only one
//! active session exists per key: starting a new one while one is running
//! supersedes the old one (the superseded session is dropped unsaved).

pub mod store;

pub use store::SnapshotStore;

use crate::model::ExtractedUrl;
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Runaway ceiling: a session still running after this long is auto-stopped
pub const SESSION_CEILING: Duration = Duration::from_secs(10 * 60);

/// Grace window a completed session stays readable before being freed
pub const COMPLETED_GRACE: Duration = Duration::from_secs(30);

/// Lifecycle state of an extraction session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Completed,
    Error,
}

/// Extraction progress counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Cards processed so far
    pub current: usize,

    /// Cards discovered in total
    pub total: usize,

    /// Distinct URLs collected
    pub url_count: usize,
}

/// One bounded extraction run scoped to a single page
#[derive(Debug)]
pub struct ExtractionSession {
    pub id: Uuid,
    pub page_key: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub progress: Progress,
    /// Results keyed by url; insertion order is discovery order
    results: IndexMap<String, ExtractedUrl>,
}

impl ExtractionSession {
    fn new(page_key: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_key: page_key.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            status: SessionStatus::Running,
            progress: Progress::default(),
            results: IndexMap::new(),
        }
    }

    /// Results in discovery order
    pub fn results(&self) -> Vec<ExtractedUrl> {
        self.results.values().cloned().collect()
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            page_key: self.page_key.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            status: self.status,
            progress: self.progress,
            results: self.results(),
        }
    }

    fn age(&self) -> Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }

    fn time_since_end(&self) -> Option<Duration> {
        self.ended_at.map(|end| (Utc::now() - end).to_std().unwrap_or_default())
    }
}

/// Serializable point-in-time copy of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub page_key: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub progress: Progress,
    pub results: Vec<ExtractedUrl>,
}

/// Read-only status answer; unknown keys report not-found instead of erroring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub found: bool,
    pub is_extracting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    pub result_count: usize,
}

impl StatusReport {
    fn not_found() -> Self {
        Self { found: false, is_extracting: false, progress: None, result_count: 0 }
    }
}

type ProgressListener = Box<dyn Fn(&str, &Progress) + Send + Sync>;

/// Owns all sessions and their result sets
pub struct SessionManager {
    sessions: Mutex<HashMap<String, ExtractionSession>>,
    listener: Mutex<Option<ProgressListener>>,
    store: Option<SnapshotStore>,
    settings: Settings,
}

impl SessionManager {
    /// Create a manager without snapshot persistence
    pub fn new(settings: Settings) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), listener: Mutex::new(None), store: None, settings }
    }

    /// Create a manager that persists stopped-session snapshots
    pub fn with_store(settings: Settings, store: SnapshotStore) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), listener: Mutex::new(None), store: Some(store), settings }
    }

    /// Register a progress listener, replacing any previous one
    pub fn on_progress(&self, listener: impl Fn(&str, &Progress) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(Box::new(listener));
        }
    }

    /// Start a session for a page key, superseding any running one
    pub fn start(&self, page_key: &str) -> Uuid {
        let session = ExtractionSession::new(page_key);
        let id = session.id;

        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(previous) = sessions.insert(page_key.to_string(), session) {
                if previous.status == SessionStatus::Running {
                    log::info!("superseding running session {} on '{}'", previous.id, page_key);
                }
            }
        }

        log::info!("session {} started on '{}'", id, page_key);
        id
    }

    /// Append URLs to a session's result set.
    ///
    /// Set semantics on the url string: the first source to report a URL wins
    /// and later duplicates are dropped. Returns how many entries were new.
    /// The `maxUrls` setting caps the set; once full, further URLs are logged
    /// and discarded.
    pub fn add_urls(&self, page_key: &str, urls: Vec<ExtractedUrl>) -> usize {
        let mut inserted = 0;
        let mut notify: Option<Progress> = None;

        if let Ok(mut sessions) = self.sessions.lock() {
            let Some(session) = sessions.get_mut(page_key) else {
                log::warn!("add_urls for unknown page key '{}' dropped", page_key);
                return 0;
            };

            for url in urls {
                if session.results.len() >= self.settings.max_urls {
                    log::warn!("session {} at maxUrls cap ({}), dropping remainder", session.id, self.settings.max_urls);
                    break;
                }
                if !session.results.contains_key(&url.url) {
                    session.results.insert(url.url.clone(), url);
                    inserted += 1;
                }
            }

            if inserted > 0 {
                session.progress.url_count = session.results.len();
                notify = Some(session.progress);
            }
        }

        if let (Some(progress), Ok(listener)) = (notify, self.listener.lock()) {
            if let Some(listener) = listener.as_ref() {
                listener(page_key, &progress);
            }
        }

        inserted
    }

    /// Update a session's card progress counters
    pub fn set_progress(&self, page_key: &str, current: usize, total: usize) {
        let mut notify: Option<Progress> = None;

        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.get_mut(page_key) {
                session.progress.current = current;
                session.progress.total = total;
                notify = Some(session.progress);
            }
        }

        if let (Some(progress), Ok(listener)) = (notify, self.listener.lock()) {
            if let Some(listener) = listener.as_ref() {
                listener(page_key, &progress);
            }
        }
    }

    /// Stop a session: mark completed, persist a snapshot.
    ///
    /// The session stays readable for [`COMPLETED_GRACE`] so a polling reader
    /// still sees the final state; [`SessionManager::tick`] frees it after.
    pub fn stop(&self, page_key: &str) {
        let snapshot = {
            let Ok(mut sessions) = self.sessions.lock() else { return };
            let Some(session) = sessions.get_mut(page_key) else {
                log::debug!("stop for unknown page key '{}' ignored", page_key);
                return;
            };

            if session.status == SessionStatus::Running {
                session.status = SessionStatus::Completed;
                session.ended_at = Some(Utc::now());
            }
            session.snapshot()
        };

        self.persist(&snapshot);
        log::info!("session {} stopped with {} URLs", snapshot.id, snapshot.results.len());
    }

    /// Read-only status snapshot; unknown/expired keys report not-found
    pub fn get_status(&self, page_key: &str) -> StatusReport {
        let Ok(sessions) = self.sessions.lock() else { return StatusReport::not_found() };

        match sessions.get(page_key) {
            Some(session) => StatusReport {
                found: true,
                is_extracting: session.status == SessionStatus::Running,
                progress: Some(session.progress),
                result_count: session.results.len(),
            },
            None => StatusReport::not_found(),
        }
    }

    /// Results of a session in discovery order; empty for unknown keys
    pub fn results(&self, page_key: &str) -> Vec<ExtractedUrl> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(page_key).map(|s| s.results()))
            .unwrap_or_default()
    }

    /// Drop a session immediately, without persisting
    pub fn clear(&self, page_key: &str) -> bool {
        self.sessions.lock().map(|mut sessions| sessions.remove(page_key).is_some()).unwrap_or(false)
    }

    /// Cooperative housekeeping, called between pipeline steps.
    ///
    /// Running sessions past [`SESSION_CEILING`] are auto-stopped (with a
    /// snapshot); completed sessions past [`COMPLETED_GRACE`] are freed.
    pub fn tick(&self) {
        let mut to_stop = Vec::new();

        if let Ok(mut sessions) = self.sessions.lock() {
            for (key, session) in sessions.iter() {
                if session.status == SessionStatus::Running && session.age() >= SESSION_CEILING {
                    log::warn!("session {} hit the {}s ceiling, auto-stopping", session.id, SESSION_CEILING.as_secs());
                    to_stop.push(key.clone());
                }
            }

            sessions.retain(|_, session| match session.time_since_end() {
                Some(elapsed) => elapsed < COMPLETED_GRACE,
                None => true,
            });
        }

        for key in to_stop {
            self.stop(&key);
        }
    }

    /// Purge persisted snapshots older than the retention window
    pub fn purge_expired_snapshots(&self) {
        if let Some(store) = &self.store {
            match store.purge_expired() {
                Ok(purged) if purged > 0 => log::info!("purged {} expired session snapshots", purged),
                Ok(_) => {}
                Err(e) => log::warn!("snapshot purge failed: {}", e),
            }
        }
    }

    fn persist(&self, snapshot: &SessionSnapshot) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(snapshot) {
                log::warn!("failed to persist session {}: {}", snapshot.id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UrlSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn url(u: &str, source: UrlSource) -> ExtractedUrl {
        ExtractedUrl::new(u, source)
    }

    const URL_A: &str = "https://admanager.google.com/1#creatives/ad_review_center/creativeId=1&ecid=2";
    const URL_B: &str = "https://admanager.google.com/1#creatives/ad_review_center/creativeId=3&ecid=4";
    const URL_C: &str = "https://admanager.google.com/1#creatives/ad_review_center/creativeId=5&ecid=6";

    #[test]
    fn test_add_urls_set_semantics() {
        let manager = SessionManager::new(Settings::default());
        manager.start("tab-1");

        let first = manager.add_urls("tab-1", vec![url(URL_A, UrlSource::Anchor), url(URL_B, UrlSource::Text)]);
        let second = manager.add_urls("tab-1", vec![url(URL_B, UrlSource::Network), url(URL_C, UrlSource::Network)]);

        assert_eq!(first, 2);
        assert_eq!(second, 1);

        // Union cardinality, not the sum.
        let results = manager.results("tab-1");
        assert_eq!(results.len(), 3);

        // First source wins on the overlap.
        assert_eq!(results[1].url, URL_B);
        assert_eq!(results[1].source, UrlSource::Text);
    }

    #[test]
    fn test_max_urls_cap() {
        let mut settings = Settings::default();
        settings.max_urls = 2;
        let manager = SessionManager::new(settings);
        manager.start("tab-1");

        let inserted = manager.add_urls(
            "tab-1",
            vec![url(URL_A, UrlSource::Anchor), url(URL_B, UrlSource::Anchor), url(URL_C, UrlSource::Anchor)],
        );

        assert_eq!(inserted, 2);
        assert_eq!(manager.results("tab-1").len(), 2);
    }

    #[test]
    fn test_get_status_not_found_never_errors() {
        let manager = SessionManager::new(Settings::default());
        let report = manager.get_status("never-started");

        assert!(!report.found);
        assert!(!report.is_extracting);
        assert_eq!(report.result_count, 0);
    }

    #[test]
    fn test_start_supersedes_running_session() {
        let manager = SessionManager::new(Settings::default());
        let first = manager.start("tab-1");
        manager.add_urls("tab-1", vec![url(URL_A, UrlSource::Anchor)]);

        let second = manager.start("tab-1");
        assert_ne!(first, second);

        // Superseded session's results are gone.
        assert!(manager.results("tab-1").is_empty());
        assert!(manager.get_status("tab-1").is_extracting);
    }

    #[test]
    fn test_stop_keeps_session_readable() {
        let manager = SessionManager::new(Settings::default());
        manager.start("tab-1");
        manager.add_urls("tab-1", vec![url(URL_A, UrlSource::Anchor)]);
        manager.stop("tab-1");

        let report = manager.get_status("tab-1");
        assert!(report.found);
        assert!(!report.is_extracting);
        assert_eq!(report.result_count, 1);

        // Inside the grace window a tick does not free it.
        manager.tick();
        assert!(manager.get_status("tab-1").found);
    }

    #[test]
    fn test_clear_drops_session() {
        let manager = SessionManager::new(Settings::default());
        manager.start("tab-1");

        assert!(manager.clear("tab-1"));
        assert!(!manager.clear("tab-1"));
        assert!(!manager.get_status("tab-1").found);
    }

    #[test]
    fn test_progress_listener_notified() {
        let manager = SessionManager::new(Settings::default());
        let notifications = Arc::new(AtomicUsize::new(0));

        let seen = notifications.clone();
        manager.on_progress(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        manager.start("tab-1");
        manager.add_urls("tab-1", vec![url(URL_A, UrlSource::Anchor)]);
        manager.set_progress("tab-1", 1, 10);

        // Duplicate-only batch inserts nothing and stays silent.
        manager.add_urls("tab-1", vec![url(URL_A, UrlSource::Network)]);

        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_urls_unknown_key_dropped() {
        let manager = SessionManager::new(Settings::default());
        assert_eq!(manager.add_urls("nope", vec![url(URL_A, UrlSource::Anchor)]), 0);
    }
}
