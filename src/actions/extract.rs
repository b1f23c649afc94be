use crate::actions::{Action, ActionContext, ActionResult};
use crate::collect::{PageInterceptor, PassiveCollector};
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for extract-urls (none required)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractUrlsParams {
    /// Network code override; resolved from the page address when absent
    #[serde(default)]
    pub network_code: Option<String>,
}

/// Run a passive extraction pass against the current page
pub struct ExtractUrlsAction;

impl Action for ExtractUrlsAction {
    type Params = ExtractUrlsParams;

    fn name(&self) -> &str {
        "extract-urls"
    }

    fn execute_typed(&self, params: ExtractUrlsParams, context: &mut ActionContext) -> Result<ActionResult> {
        context.sessions.tick();

        if !context.sessions.get_status(&context.page_key).is_extracting {
            context.sessions.start(&context.page_key);
        }

        // Idempotent; a second pass on the same page reuses the buffers.
        if let Err(e) = PageInterceptor::install(&context.session) {
            log::warn!("interceptor install failed: {}", e);
        }

        let collector = match params.network_code {
            Some(code) => PassiveCollector::new(code),
            None => PassiveCollector::for_session(&context.session),
        };

        let found = collector.collect(&context.session);
        let inserted = context.sessions.add_urls(&context.page_key, found);

        let results = context.sessions.results(&context.page_key);
        Ok(ActionResult::success_with(serde_json::json!({
            "urls": results,
            "count": results.len(),
            "new": inserted,
            "network_code": collector.network_code(),
        })))
    }
}

/// Parameters for stop-extraction (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StopExtractionParams {}

/// Stop the page's running session
pub struct StopExtractionAction;

impl Action for StopExtractionAction {
    type Params = StopExtractionParams;

    fn name(&self) -> &str {
        "stop-extraction"
    }

    fn execute_typed(&self, _params: StopExtractionParams, context: &mut ActionContext) -> Result<ActionResult> {
        context.sessions.stop(&context.page_key);
        Ok(ActionResult::success())
    }
}

/// Parameters for get-status (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetStatusParams {}

/// Read the page's session status
pub struct GetStatusAction;

impl Action for GetStatusAction {
    type Params = GetStatusParams;

    fn name(&self) -> &str {
        "get-status"
    }

    fn execute_typed(&self, _params: GetStatusParams, context: &mut ActionContext) -> Result<ActionResult> {
        context.sessions.tick();
        let report = context.sessions.get_status(&context.page_key);
        Ok(ActionResult::success_with(serde_json::to_value(report)?))
    }
}

/// Parameters for clear-session (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClearSessionParams {}

/// Drop the page's session and results immediately
pub struct ClearSessionAction;

impl Action for ClearSessionAction {
    type Params = ClearSessionParams;

    fn name(&self) -> &str {
        "clear-session"
    }

    fn execute_typed(&self, _params: ClearSessionParams, context: &mut ActionContext) -> Result<ActionResult> {
        let cleared = context.sessions.clear(&context.page_key);
        Ok(ActionResult::success_with(serde_json::json!({ "cleared": cleared })))
    }
}
