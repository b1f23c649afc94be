use crate::browser::BrowserSession;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One buffered network response from the target host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkCapture {
    /// Request URL
    pub url: String,

    /// Response body
    pub data: String,

    /// Capture time as reported by the page
    pub timestamp: String,
}

/// One intercepted clipboard write matching the canonical URL shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipboardCapture {
    /// The copied string, already known to match the canonical shape
    pub text: String,

    /// Capture time as reported by the page
    pub timestamp: String,
}

/// Installs and reads the page-side network/clipboard interceptors.
///
/// The interceptors are page-global monkey-patches over fetch, XHR and
/// `navigator.clipboard.writeText`; at most one installation is active per
/// page. The install script guards with a presence flag, so calling
/// [`PageInterceptor::install`] again on the same page is a no-op. Wrapped
/// primitives always forward to the originals, leaving page behavior intact.
pub struct PageInterceptor;

impl PageInterceptor {
    /// Install the interceptors into the active tab's page context.
    ///
    /// Returns `true` when this call performed the installation, `false` when
    /// a previous installation was already active.
    pub fn install(session: &BrowserSession) -> Result<bool> {
        let js_code = include_str!("install_interceptors.js");
        let outcome = session.evaluate_json(js_code)?;

        let newly_installed = outcome.as_str() == Some("installed");
        if newly_installed {
            log::debug!("page interceptors installed");
        } else {
            log::debug!("page interceptors already present, skipping install");
        }
        Ok(newly_installed)
    }

    /// Whether the interceptors are present in the page
    pub fn is_installed(session: &BrowserSession) -> Result<bool> {
        let value = session
            .evaluate_json("Boolean(window.__reviewUrlCapture && window.__reviewUrlCapture.installed)")?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Read the buffered network captures.
    ///
    /// The buffer keeps accumulating for the page's lifetime; repeated reads
    /// return overlapping slices and the aggregator's set semantics absorb the
    /// duplicates.
    pub fn network_captures(session: &BrowserSession) -> Result<Vec<NetworkCapture>> {
        let js = r#"(function() {
            var c = window.__reviewUrlCapture;
            return JSON.stringify(c ? c.network : []);
        })()"#;

        let value = session.evaluate_parsed(js)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Read and clear the buffered clipboard captures.
    ///
    /// Draining keeps one interaction pass's copies from being re-attributed
    /// on the next pass.
    pub fn drain_clipboard(session: &BrowserSession) -> Result<Vec<ClipboardCapture>> {
        let js = r#"(function() {
            var c = window.__reviewUrlCapture;
            if (!c) return JSON.stringify([]);
            var out = c.clipboard.slice();
            c.clipboard.length = 0;
            return JSON.stringify(out);
        })()"#;

        let value = session.evaluate_parsed(js)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}
