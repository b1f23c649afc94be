//! # ad-review-extractor
//!
//! A Rust library for extracting ad-creative review URLs from Google Ad Manager
//! via a headless Chrome (CDP) automation harness.
//!
//! ## Features
//!
//! - **URL Pattern Matching**: Recognize canonical review center URLs in arbitrary
//!   text, and reconstruct them from fragmentary creativeId/ecid pairs
//! - **Shadow-Aware DOM Traversal**: Recursive walking over element trees including
//!   open shadow roots and same-origin frames
//! - **Passive Collection**: Anchors, page text, framework global state, web
//!   storage, intercepted network payloads, intercepted clipboard writes
//! - **Active Interaction**: Per-card menu driving ("copy URL to share ad") with
//!   the clipboard side channel capturing the result
//! - **Session Aggregation**: Deduplicated, provenance-tagged result sets with
//!   bounded lifecycles and snapshot persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ad_review_extractor::harness::{extract_urls, HarnessOptions};
//!
//! # fn main() -> ad_review_extractor::Result<()> {
//! let report = extract_urls(HarnessOptions {
//!     network_code: Some("123456".to_string()),
//!     ..HarnessOptions::default()
//! })?;
//!
//! println!("found {} URLs", report.total_urls);
//! for entry in &report.urls {
//!     println!("{} ({})", entry.url, entry.source.as_str());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the Pipeline Yourself
//!
//! ```rust,no_run
//! use ad_review_extractor::browser::{BrowserSession, LaunchOptions};
//! use ad_review_extractor::collect::{PageInterceptor, PassiveCollector};
//!
//! # fn main() -> ad_review_extractor::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://admanager.google.com/123456#creatives/ad_review_center")?;
//! session.wait_for_navigation()?;
//!
//! PageInterceptor::install(&session)?;
//! let collector = PassiveCollector::for_session(&session);
//! let urls = collector.collect(&session);
//! # Ok(())
//! # }
//! ```
//!
//! ## Message Protocol
//!
//! Hosts (a popup, an automation script) talk to the pipeline through named
//! actions over a bounded request/response channel:
//!
//! ```rust,no_run
//! use ad_review_extractor::channel::MessageChannel;
//! use ad_review_extractor::harness::{ExtractionHarness, HarnessOptions};
//!
//! # fn main() -> ad_review_extractor::Result<()> {
//! let harness = ExtractionHarness::launch(HarnessOptions::default())?;
//! let channel = harness.channel();
//!
//! let response = channel.request("extract-urls", serde_json::json!({}));
//! assert!(response.success || response.error.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`pattern`]: Canonical URL recognition and reconstruction
//! - [`dom`]: Element trees, shadow-aware walking, per-frame extraction
//! - [`collect`]: Passive sources and the network/clipboard interceptors
//! - [`drive`]: The per-card interaction state machine and lazy-load scrolling
//! - [`session`]: Session lifecycle, deduplication, snapshot persistence
//! - [`actions`] / [`channel`]: The typed cross-context message protocol
//! - [`harness`]: One-call launch-to-report orchestration
//! - [`export`]: CSV and structured JSON result forms

pub mod actions;
pub mod browser;
pub mod channel;
pub mod collect;
pub mod dom;
pub mod drive;
pub mod error;
pub mod export;
pub mod harness;
pub mod model;
pub mod pattern;
pub mod session;
pub mod settings;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use dom::{DomTree, ElementNode};
pub use error::{ExtractorError, Result};
pub use export::ResultsReport;
pub use harness::{extract_urls, ExtractionHarness, HarnessOptions};
pub use model::{ExtractedUrl, IdentifierPair, UrlSource};
pub use session::{SessionManager, StatusReport};
pub use settings::Settings;
