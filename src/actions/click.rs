use crate::actions::{Action, ActionContext, ActionResult};
use crate::drive;
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the force-click action
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForceClickParams {
    /// CSS selector of the element to click
    pub selector: String,
}

/// Click the first element matching a CSS selector
pub struct ForceClickAction;

impl Action for ForceClickAction {
    type Params = ForceClickParams;

    fn name(&self) -> &str {
        "force-click"
    }

    fn execute_typed(&self, params: ForceClickParams, context: &mut ActionContext) -> Result<ActionResult> {
        let selector = serde_json::to_string(&params.selector)?;
        let js = format!(
            r#"(function() {{
                var element = document.querySelector({selector});
                if (!element) return 'not-found';
                element.click();
                return 'clicked';
            }})()"#
        );

        let outcome = context.session.evaluate_json(&js)?;
        context.invalidate_dom();

        if outcome.as_str() == Some("clicked") {
            Ok(ActionResult::success_with(serde_json::json!({ "selector": params.selector })))
        } else {
            Ok(ActionResult::failure(format!("Element not found: {}", params.selector)))
        }
    }
}

/// Parameters for the targeted-click action
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TargetedClickParams {
    /// Text the target element's content must contain
    pub text: String,
}

/// Click the element whose text contains a phrase, searching shadow roots too
pub struct TargetedClickAction;

impl Action for TargetedClickAction {
    type Params = TargetedClickParams;

    fn name(&self) -> &str {
        "targeted-click"
    }

    fn execute_typed(&self, params: TargetedClickParams, context: &mut ActionContext) -> Result<ActionResult> {
        let clicked = drive::targeted_click(&context.session, &params.text, drive::DriverConfig::default().search_depth)?;
        context.invalidate_dom();

        if clicked {
            Ok(ActionResult::success_with(serde_json::json!({ "text": params.text })))
        } else {
            Ok(ActionResult::failure(format!("No clickable element containing \"{}\"", params.text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_click_params() {
        let params: ForceClickParams = serde_json::from_value(serde_json::json!({"selector": "#btn"})).unwrap();
        assert_eq!(params.selector, "#btn");
    }

    #[test]
    fn test_targeted_click_params_require_text() {
        let missing: std::result::Result<TargetedClickParams, _> = serde_json::from_value(serde_json::json!({}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_action_names() {
        assert_eq!(ForceClickAction.name(), "force-click");
        assert_eq!(TargetedClickAction.name(), "targeted-click");
    }
}
