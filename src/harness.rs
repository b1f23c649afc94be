//! Top-level automation harness: one call from launch to report
//!
//! Mirrors the way an operator would run the extension by hand: open the
//! console, wait for cards to render, harvest everything passive, scroll the
//! lazy loader dry, work through every card's menu, then collect what the
//! interaction shook loose.

use crate::browser::{BrowserSession, LaunchOptions};
use crate::collect::{PageInterceptor, PassiveCollector};
use crate::drive::{DriverConfig, InteractionDriver};
use crate::error::Result;
use crate::export::ResultsReport;
use crate::pattern;
use crate::session::{SessionManager, SnapshotStore};
use crate::settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Selectors whose presence says the console has rendered its cards
const READINESS_SELECTORS: [&str; 5] =
    ["[data-creative-id]", ".creative-card", ".ad-card", ".review-card", "material-select-item"];

/// Options for one harness run
#[derive(Debug, Clone, Default)]
pub struct HarnessOptions {
    /// Browser launch options
    pub launch: LaunchOptions,

    /// Network code to open the console under; when absent the code is
    /// resolved from wherever the browser lands
    pub network_code: Option<String>,

    /// Extraction settings
    pub settings: Settings,

    /// Directory for stopped-session snapshots; in-memory only when absent
    pub snapshot_dir: Option<PathBuf>,
}

/// Owns a browser session and drives the full extraction pipeline
pub struct ExtractionHarness {
    session: Arc<BrowserSession>,
    sessions: Arc<SessionManager>,
    settings: Settings,
    driver: InteractionDriver,
    network_code: Option<String>,
    page_key: String,
}

impl ExtractionHarness {
    /// Launch a browser and prepare the pipeline
    pub fn launch(options: HarnessOptions) -> Result<Self> {
        let session = Arc::new(BrowserSession::launch(options.launch)?);

        let manager = match &options.snapshot_dir {
            Some(dir) => SessionManager::with_store(options.settings.clone(), SnapshotStore::open(dir)?),
            None => SessionManager::new(options.settings.clone()),
        };

        let page_key = session.tab().map(|tab| tab.get_target_id().clone()).unwrap_or_else(|_| "main".to_string());

        let driver = InteractionDriver::new(DriverConfig::with_settle_delay(options.settings.settle_delay()));

        Ok(Self {
            session,
            sessions: Arc::new(manager),
            settings: options.settings,
            driver,
            network_code: options.network_code,
            page_key,
        })
    }

    /// The browser session
    pub fn session(&self) -> Arc<BrowserSession> {
        self.session.clone()
    }

    /// The session manager
    pub fn sessions(&self) -> Arc<SessionManager> {
        self.sessions.clone()
    }

    /// The key extraction sessions run under
    pub fn page_key(&self) -> &str {
        &self.page_key
    }

    /// A message channel dispatching the default actions against this harness
    pub fn channel(&self) -> crate::channel::DispatchChannel {
        crate::channel::DispatchChannel::for_registry(
            Arc::new(crate::actions::ActionRegistry::with_defaults()),
            self.session.clone(),
            self.sessions.clone(),
            self.settings.clone(),
            self.page_key.clone(),
            crate::channel::DEFAULT_TIMEOUT,
        )
    }

    /// Open the review center and wait for it to render
    pub fn navigate_to_console(&self) -> Result<()> {
        let url = match &self.network_code {
            Some(code) => format!("https://{}/{}#creatives/ad_review_center", pattern::TARGET_HOST, code),
            None => format!("https://{}/", pattern::TARGET_HOST),
        };

        log::info!("navigating to {}", url);
        self.session.navigate(&url)?;
        self.session.wait_for_navigation()?;
        self.wait_for_console_load();
        Ok(())
    }

    /// Wait for the console UI using the readiness selector candidates.
    ///
    /// Finding none after the configured attempts is a soft miss: the
    /// extraction still runs against whatever did render.
    fn wait_for_console_load(&self) {
        let selectors = match serde_json::to_string(&READINESS_SELECTORS) {
            Ok(s) => s,
            Err(_) => return,
        };
        let js = format!(
            r#"(function() {{
                var SELECTORS = {selectors};
                for (var i = 0; i < SELECTORS.length; i++) {{
                    try {{
                        if (document.querySelectorAll(SELECTORS[i]).length > 0) return SELECTORS[i];
                    }} catch (e) {{}}
                }}
                return document.readyState === 'complete' ? 'ready' : 'loading';
            }})()"#
        );

        for attempt in 0..self.settings.retry_attempts.max(1) {
            match self.session.evaluate_json(&js) {
                Ok(value) => match value.as_str() {
                    Some("loading") | None => {}
                    Some("ready") => {
                        log::debug!("no console elements yet, page load complete (attempt {})", attempt + 1);
                    }
                    Some(selector) => {
                        log::info!("console ready, matched '{}'", selector);
                        return;
                    }
                },
                Err(e) => log::debug!("readiness probe failed: {}", e),
            }
            std::thread::sleep(Duration::from_millis(1000));
        }

        log::warn!("console elements never appeared, extracting from the page as-is");
    }

    /// Run the full extraction pipeline and report the deduplicated results
    pub fn run(&self) -> Result<ResultsReport> {
        self.sessions.tick();
        self.sessions.start(&self.page_key);

        if let Err(e) = PageInterceptor::install(&self.session) {
            log::warn!("interceptor install failed: {}", e);
        }

        let location = self.session.current_url().unwrap_or_default();
        let network_code = pattern::resolve_network_code(&location);
        let collector = PassiveCollector::new(network_code.clone());

        // Passive pass over the initial page state.
        let found = collector.collect(&self.session);
        self.sessions.add_urls(&self.page_key, found);

        // Pull in everything the lazy loader is still holding back.
        if let Err(e) = self.driver.scroll_to_page_bottom(&self.session) {
            log::warn!("lazy-load scroll failed: {}", e);
        }

        // Active pass; copied URLs land in the clipboard buffer.
        match self.driver.run_with(&self.session, |current, total| {
            self.sessions.set_progress(&self.page_key, current, total);
        }) {
            Ok(outcomes) => log::info!("interaction pass finished over {} cards", outcomes.len()),
            Err(e) => log::warn!("interaction pass failed: {}", e),
        }

        // Final passive pass drains the clipboard buffer and rescans the
        // network buffer the interaction filled.
        let found = collector.collect(&self.session);
        self.sessions.add_urls(&self.page_key, found);

        let results = self.sessions.results(&self.page_key);
        self.sessions.stop(&self.page_key);
        self.sessions.purge_expired_snapshots();

        log::info!("extraction complete, {} unique URLs", results.len());
        Ok(ResultsReport::new(network_code, results))
    }

    /// Save a PNG screenshot of the page
    pub fn save_screenshot(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let png = self.session.capture_screenshot()?;
        std::fs::write(path, png)?;
        Ok(())
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        self.session.close()
    }
}

/// Run a complete extraction: launch, navigate, extract, close.
///
/// The browser is closed on every exit path, including launch-adjacent
/// failures after the browser is up.
pub fn extract_urls(options: HarnessOptions) -> Result<ResultsReport> {
    let harness = ExtractionHarness::launch(options)?;

    let outcome = harness.navigate_to_console().and_then(|_| harness.run());

    if let Err(e) = harness.close() {
        log::warn!("browser close failed: {}", e);
    }

    outcome
}
