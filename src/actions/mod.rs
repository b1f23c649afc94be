//! Named actions behind the cross-context message protocol
//!
//! Each action is a typed unit: serde-deserialized parameters (with a schemars
//! schema for introspection), a wire name, and an execute method against an
//! [`ActionContext`]. The registry dispatches by name; unknown names are an
//! explicit error that the channel layer turns into a failure response.

pub mod click;
pub mod extract;
pub mod misc;

pub use click::{ForceClickAction, TargetedClickAction};
pub use extract::{ClearSessionAction, ExtractUrlsAction, GetStatusAction, StopExtractionAction};
pub use misc::{PingAction, ToggleSidebarAction};

use crate::browser::BrowserSession;
use crate::dom::DomTree;
use crate::error::{ExtractorError, Result};
use crate::session::SessionManager;
use crate::settings::Settings;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Result of executing an action
#[derive(Debug, Clone)]
pub struct ActionResult {
    /// Whether the action succeeded
    pub success: bool,

    /// Structured payload on success
    pub data: Option<serde_json::Value>,

    /// Failure message on error
    pub error: Option<String>,
}

impl ActionResult {
    /// A bare success with no payload
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    /// A success carrying a payload
    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    /// An explicit failure with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

/// Execution context handed to every action
pub struct ActionContext {
    /// The browser session actions operate on
    pub session: Arc<BrowserSession>,

    /// The session manager owning result sets
    pub sessions: Arc<SessionManager>,

    /// Effective settings for this page
    pub settings: Settings,

    /// Key of the page this context is scoped to
    pub page_key: String,

    dom_cache: Option<DomTree>,
}

impl ActionContext {
    /// Create a context scoped to one page key
    pub fn new(
        session: Arc<BrowserSession>,
        sessions: Arc<SessionManager>,
        settings: Settings,
        page_key: impl Into<String>,
    ) -> Self {
        Self { session, sessions, settings, page_key: page_key.into(), dom_cache: None }
    }

    /// The main frame's DOM tree, extracted once and cached for this context
    pub fn get_dom(&mut self) -> Result<&DomTree> {
        if self.dom_cache.is_none() {
            self.dom_cache = Some(self.session.extract_dom()?);
        }
        self.dom_cache.as_ref().ok_or_else(|| ExtractorError::DomParseFailed("DOM cache empty".to_string()))
    }

    /// Drop the cached DOM (after actions that mutate the page)
    pub fn invalidate_dom(&mut self) {
        self.dom_cache = None;
    }
}

/// A named, typed action
pub trait Action {
    /// Parameter type, deserialized from the request's params value
    type Params: DeserializeOwned + JsonSchema;

    /// Wire name of the action (e.g. "extract-urls")
    fn name(&self) -> &str;

    /// Execute with already-deserialized parameters
    fn execute_typed(&self, params: Self::Params, context: &mut ActionContext) -> Result<ActionResult>;

    /// JSON schema of the parameter type
    fn parameters_schema(&self) -> serde_json::Value
    where
        Self: Sized,
    {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// Object-safe wrapper so actions with different Params share one registry
trait ErasedAction: Send + Sync {
    fn name(&self) -> &str;
    fn execute(&self, params: serde_json::Value, context: &mut ActionContext) -> Result<ActionResult>;
}

impl<A> ErasedAction for A
where
    A: Action + Send + Sync,
{
    fn name(&self) -> &str {
        Action::name(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ActionContext) -> Result<ActionResult> {
        let typed: A::Params = serde_json::from_value(params).map_err(|e| ExtractorError::InvalidParams {
            action: Action::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.execute_typed(typed, context)
    }
}

/// Registry of all recognized actions, dispatched by wire name
pub struct ActionRegistry {
    actions: IndexMap<String, Box<dyn ErasedAction>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { actions: IndexMap::new() }
    }

    /// Registry with every built-in action registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ExtractUrlsAction);
        registry.register(StopExtractionAction);
        registry.register(GetStatusAction);
        registry.register(ClearSessionAction);
        registry.register(ForceClickAction);
        registry.register(TargetedClickAction);
        registry.register(ToggleSidebarAction);
        registry.register(PingAction);
        registry
    }

    /// Register an action under its own name
    pub fn register<A>(&mut self, action: A)
    where
        A: Action + Send + Sync + 'static,
    {
        self.actions.insert(Action::name(&action).to_string(), Box::new(action));
    }

    /// Execute an action by wire name.
    ///
    /// Unknown names are an error, never silence.
    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ActionContext) -> Result<ActionResult> {
        let action = self.actions.get(name).ok_or_else(|| ExtractorError::UnknownAction(name.to_string()))?;
        action.execute(params, context)
    }

    /// Whether a wire name is recognized
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// All registered wire names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        let registry = ActionRegistry::with_defaults();
        let names = registry.names();

        for expected in [
            "extract-urls",
            "stop-extraction",
            "get-status",
            "clear-session",
            "force-click",
            "targeted-click",
            "toggle-sidebar",
            "ping",
        ] {
            assert!(names.contains(&expected), "missing action {}", expected);
        }
    }

    #[test]
    fn test_unknown_action_is_explicit() {
        let registry = ActionRegistry::with_defaults();
        assert!(!registry.contains("frobnicate"));
    }

    #[test]
    fn test_action_result_constructors() {
        let ok = ActionResult::success_with(serde_json::json!({"n": 1}));
        assert!(ok.success);
        assert_eq!(ok.data.unwrap()["n"], 1);

        let fail = ActionResult::failure("nope");
        assert!(!fail.success);
        assert_eq!(fail.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_parameters_schema_present() {
        let action = ForceClickAction;
        let schema = action.parameters_schema();
        assert!(schema.is_object());
        assert!(schema.to_string().contains("selector"));
    }
}
