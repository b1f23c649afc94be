//! Request/response message channel between execution contexts
//!
//! The popup/background/content split of the original extension becomes an
//! explicit protocol here: a caller sends a named action with JSON params and
//! always gets a [`Response`] back (success, failure, or a timeout failure).
//! No error ever crosses the channel as a panic, and no call hangs past the
//! configured timeout.
//!
//! Handlers run on a worker thread. When a handler outlives the timeout the
//! channel stays open on the handler's side (the work completes, its late
//! response is discarded); the caller has already been told the operation
//! failed.

use crate::actions::{ActionContext, ActionRegistry, ActionResult};
use crate::browser::BrowserSession;
use crate::session::SessionManager;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Default ceiling on waiting for a response
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One message sent across the channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlates the response to this request
    pub id: u64,

    /// Wire name of the action
    pub action: String,

    /// Action parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The answer to one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Id of the request being answered
    pub id: u64,

    /// Whether the action succeeded
    pub success: bool,

    /// Structured payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Failure message on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// A success response with an optional payload
    pub fn ok(id: u64, data: Option<serde_json::Value>) -> Self {
        Self { id, success: true, data, error: None }
    }

    /// An explicit failure response
    pub fn failure(id: u64, message: impl Into<String>) -> Self {
        Self { id, success: false, data: None, error: Some(message.into()) }
    }

    /// Convert an action's outcome into a response
    pub fn from_result(id: u64, result: ActionResult) -> Self {
        Self { id, success: result.success, data: result.data, error: result.error }
    }
}

/// An abstract request/response channel
pub trait MessageChannel {
    /// Send an action request and wait (bounded) for its response
    fn request(&self, action: &str, params: serde_json::Value) -> Response;
}

type Handler = dyn Fn(Request) -> Response + Send + Sync;

/// Channel that runs a handler on a worker thread with a response timeout
pub struct DispatchChannel {
    handler: Arc<Handler>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl DispatchChannel {
    /// Create a channel over an arbitrary handler
    pub fn new(handler: impl Fn(Request) -> Response + Send + Sync + 'static, timeout: Duration) -> Self {
        Self { handler: Arc::new(handler), timeout, next_id: AtomicU64::new(1) }
    }

    /// Channel dispatching into an action registry.
    ///
    /// Every request gets a fresh [`ActionContext`] scoped to `page_key`, so
    /// one request's cached DOM never leaks into the next.
    pub fn for_registry(
        registry: Arc<ActionRegistry>,
        session: Arc<BrowserSession>,
        sessions: Arc<SessionManager>,
        settings: Settings,
        page_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let page_key = page_key.into();
        Self::new(
            move |request: Request| {
                let mut context =
                    ActionContext::new(session.clone(), sessions.clone(), settings.clone(), page_key.clone());
                match registry.execute(&request.action, request.params, &mut context) {
                    Ok(result) => Response::from_result(request.id, result),
                    Err(e) => Response::failure(request.id, e.to_string()),
                }
            },
            timeout,
        )
    }
}

impl MessageChannel for DispatchChannel {
    fn request(&self, action: &str, params: serde_json::Value) -> Response {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = Request { id, action: action.to_string(), params };

        let (tx, rx) = mpsc::channel();
        let handler = self.handler.clone();
        std::thread::spawn(move || {
            let _ = tx.send(handler(request));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(response) => response,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("action '{}' produced no response within {:?}", action, self.timeout);
                Response::failure(id, format!("No response within {:?}", self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Response::failure(id, "Handler disconnected before responding".to_string())
            }
        }
    }
}
