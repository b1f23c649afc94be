use crate::actions::{Action, ActionContext, ActionResult};
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for ping (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PingParams {}

/// Liveness probe; proves the channel and dispatcher are wired up
pub struct PingAction;

impl Action for PingAction {
    type Params = PingParams;

    fn name(&self) -> &str {
        "ping"
    }

    fn execute_typed(&self, _params: PingParams, _context: &mut ActionContext) -> Result<ActionResult> {
        Ok(ActionResult::success())
    }
}

/// Parameters for toggle-sidebar (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ToggleSidebarParams {}

/// Slide the in-page results panel in or out
pub struct ToggleSidebarAction;

impl Action for ToggleSidebarAction {
    type Params = ToggleSidebarParams;

    fn name(&self) -> &str {
        "toggle-sidebar"
    }

    fn execute_typed(&self, _params: ToggleSidebarParams, context: &mut ActionContext) -> Result<ActionResult> {
        let js = r#"(function() {
            var sidebar = document.getElementById('review-extractor-sidebar');
            if (!sidebar) {
                sidebar = document.createElement('div');
                sidebar.id = 'review-extractor-sidebar';
                sidebar.style.cssText = 'position:fixed;top:0;right:-450px;width:400px;height:100%;' +
                    'background:#1a1a1a;border-left:1px solid #333;box-shadow:-2px 0 5px rgba(0,0,0,0.5);' +
                    'z-index:2147483647;transition:right 0.3s ease;';
                sidebar.dataset.open = 'false';
                document.body.appendChild(sidebar);
            }
            var open = sidebar.dataset.open === 'true';
            sidebar.dataset.open = open ? 'false' : 'true';
            sidebar.style.right = open ? '-450px' : '0';
            return JSON.stringify({ open: !open });
        })()"#;

        let outcome = context.session.evaluate_parsed(js)?;
        Ok(ActionResult::success_with(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(PingAction.name(), "ping");
        assert_eq!(ToggleSidebarAction.name(), "toggle-sidebar");
    }

    #[test]
    fn test_empty_params_deserialize() {
        let _: PingParams = serde_json::from_value(serde_json::json!({})).unwrap();
        let _: ToggleSidebarParams = serde_json::from_value(serde_json::json!({})).unwrap();
    }
}
