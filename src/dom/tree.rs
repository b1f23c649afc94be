use crate::dom::element::ElementNode;
use crate::dom::walker::{self, DEFAULT_DOM_DEPTH};
use crate::error::{ExtractorError, Result};
use crate::model::IdentifierPair;
use headless_chrome::Tab;
use std::sync::Arc;

/// Represents the element tree of one document (one frame)
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Root element of the tree
    pub root: ElementNode,
}

impl DomTree {
    /// Create a DomTree from an already-built root
    pub fn new(root: ElementNode) -> Self {
        Self { root }
    }

    /// Build the tree of the tab's main frame
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let mut frames = Self::from_frames(tab)?;
        if frames.is_empty() {
            return Err(ExtractorError::DomParseFailed("no document root returned".to_string()));
        }
        Ok(frames.remove(0))
    }

    /// Build one tree per frame context.
    ///
    /// The serialization script runs once per same-origin frame (the main
    /// document first); cross-origin frames cannot be read and are skipped.
    /// Callers merge the per-frame results.
    pub fn from_frames(tab: &Arc<Tab>) -> Result<Vec<Self>> {
        let js_code = include_str!("extract_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| ExtractorError::DomParseFailed(format!("Failed to execute DOM extraction script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| ExtractorError::DomParseFailed("No value returned from DOM extraction".to_string()))?;

        // The script returns a JSON string holding an array of frame roots.
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| ExtractorError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let roots: Vec<ElementNode> = serde_json::from_str(&json_str)
            .map_err(|e| ExtractorError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;

        Ok(roots.into_iter().map(Self::new).collect())
    }

    /// Visit every element in the tree, shadow roots included
    pub fn visit<'a, F: FnMut(&'a ElementNode)>(&'a self, visitor: &mut F) {
        walker::walk(&self.root, visitor, DEFAULT_DOM_DEPTH);
    }

    /// Collect the href of every anchor element
    pub fn anchor_hrefs(&self) -> Vec<String> {
        let mut hrefs = Vec::new();
        self.visit(&mut |node| {
            if node.is_tag("a") {
                if let Some(href) = node.get_attribute("href") {
                    hrefs.push(href.clone());
                }
            }
        });
        hrefs
    }

    /// Aggregate all text in the tree, one line per text-bearing element.
    ///
    /// Script elements are included on purpose: inline script bodies are where
    /// the console leaks creativeId/ecid pairs.
    pub fn full_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        self.visit(&mut |node| {
            if let Some(text) = &node.text_content {
                parts.push(text);
            }
        });
        parts.join("\n")
    }

    /// Collect creativeId/ecid pairs carried as data attributes on one element
    pub fn data_attribute_pairs(&self) -> Vec<IdentifierPair> {
        let mut pairs = Vec::new();
        self.visit(&mut |node| {
            if let (Some(creative_id), Some(ecid)) =
                (node.get_attribute("data-creative-id"), node.get_attribute("data-ecid"))
            {
                pairs.push(IdentifierPair { creative_id: creative_id.clone(), ecid: ecid.clone() });
            }
        });
        pairs
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    /// Convert the tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| ExtractorError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> ElementNode {
        let mut root = ElementNode::new("body");

        let mut header = ElementNode::new("header");
        let mut link = ElementNode::new("a");
        link.add_attribute(
            "href",
            "https://admanager.google.com/123#creatives/ad_review_center/product=MOBILE&creativeId=1&ecid=2",
        );
        link.text_content = Some("Review".to_string());
        header.add_child(link);

        let mut card = ElementNode::new("div");
        card.add_attribute("data-creative-id", "77");
        card.add_attribute("data-ecid", "88");

        let shadow_link = ElementNode::new("a")
            .with_text("shadow link")
            .with_attributes([("href".to_string(), "/relative".to_string())].into_iter().collect());
        let menu = ElementNode::new("material-menu").with_shadow_root(vec![shadow_link]);

        let script = ElementNode::new("script").with_text(r#"var data = {"creativeId": "9", "ecid": "10"};"#);

        root.add_child(header);
        root.add_child(card);
        root.add_child(menu);
        root.add_child(script);
        root
    }

    #[test]
    fn test_anchor_hrefs_reaches_shadow() {
        let tree = DomTree::new(create_test_tree());
        let hrefs = tree.anchor_hrefs();

        assert_eq!(hrefs.len(), 2);
        assert!(hrefs[0].contains("creativeId=1"));
        assert_eq!(hrefs[1], "/relative");
    }

    #[test]
    fn test_full_text_includes_scripts() {
        let tree = DomTree::new(create_test_tree());
        let text = tree.full_text();

        assert!(text.contains("Review"));
        assert!(text.contains("shadow link"));
        assert!(text.contains("\"creativeId\": \"9\""));
    }

    #[test]
    fn test_data_attribute_pairs() {
        let tree = DomTree::new(create_test_tree());
        let pairs = tree.data_attribute_pairs();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].creative_id, "77");
        assert_eq!(pairs[0].ecid, "88");
    }

    #[test]
    fn test_count_elements() {
        let tree = DomTree::new(create_test_tree());
        // body, header, a, div, material-menu, shadow a, script
        assert_eq!(tree.count_elements(), 7);
    }

    #[test]
    fn test_frame_roots_parse() {
        // Shape produced by extract_dom.js: an array of per-frame roots.
        let json = r#"[
            {"tag_name": "body", "children": [{"tag_name": "p", "text_content": "main"}]},
            {"tag_name": "body", "children": [{"tag_name": "p", "text_content": "frame"}]}
        ]"#;

        let roots: Vec<ElementNode> = serde_json::from_str(json).unwrap();
        let trees: Vec<DomTree> = roots.into_iter().map(DomTree::new).collect();

        assert_eq!(trees.len(), 2);
        assert!(trees[0].full_text().contains("main"));
        assert!(trees[1].full_text().contains("frame"));
    }

    #[test]
    fn test_to_json() {
        let tree = DomTree::new(create_test_tree());
        let json = tree.to_json().unwrap();

        assert!(json.contains("\"tag_name\": \"body\""));
        assert!(json.contains("shadow_root"));
    }
}
