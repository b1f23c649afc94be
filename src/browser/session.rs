use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            dom::DomTree,
            error::{ExtractorError, Result}};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Extraction runs can sit idle between passes; keep the browser alive well past the 30-second default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| ExtractorError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| ExtractorError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser =
            Browser::connect(options.ws_url).map_err(|e| ExtractorError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| ExtractorError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: check for both visibility and focus (strongest signal)
        for tab in &tabs {
            let result = tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false);
            match result {
                Ok(remote_object) => {
                    if let Some(value) = remote_object.value {
                        if value.as_bool().unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        // Second pass: check just for visibility (weaker signal, but better than nothing)
        for tab in &tabs {
            let result = tab.evaluate("document.visibilityState === 'visible'", false);
            match result {
                Ok(remote_object) => {
                    if let Some(value) = remote_object.value {
                        if value.as_bool().unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                }
                Err(_) => continue,
            }
        }

        // Headless tabs sometimes report neither; fall back to the first tab.
        tabs.into_iter()
            .next()
            .ok_or_else(|| ExtractorError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| ExtractorError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| ExtractorError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Address of the active tab's current page
    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// Evaluate JavaScript in the active tab, returning the raw result value
    pub fn evaluate_json(&self, js: &str) -> Result<serde_json::Value> {
        let result = self
            .tab()?
            .evaluate(js, false)
            .map_err(|e| ExtractorError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate JavaScript that returns a JSON string, and parse it.
    ///
    /// Page scripts serialize their results with JSON.stringify so that only a
    /// plain string crosses the protocol boundary.
    pub fn evaluate_parsed(&self, js: &str) -> Result<serde_json::Value> {
        match self.evaluate_json(js)? {
            serde_json::Value::String(s) => serde_json::from_str(&s)
                .map_err(|e| ExtractorError::EvaluationFailed(format!("Failed to parse script result: {}", e))),
            other => Ok(other),
        }
    }

    /// Extract the DOM tree from the active tab
    pub fn extract_dom(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.tab()?)
    }

    /// Extract one DOM tree per same-origin frame in the active tab
    pub fn extract_frames(&self) -> Result<Vec<DomTree>> {
        DomTree::from_frames(&self.tab()?)
    }

    /// Capture a PNG screenshot of the active tab
    pub fn capture_screenshot(&self) -> Result<Vec<u8>> {
        self.tab()?
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| ExtractorError::TabOperationFailed(format!("Failed to capture screenshot: {}", e)))
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // The Browser struct has no public close method in headless_chrome;
        // closing every tab shuts the instance down, and drop finishes the rest.
        let tabs = self.get_tabs()?;
        for tab in tabs {
            let _ = tab.close(false); // Ignore errors on individual tab closes
        }
        Ok(())
    }
}
