//! DOM extraction and traversal module
//!
//! This module provides the traversal engine the collectors are built on:
//! - ElementNode: serialized representation of DOM elements, shadow roots included
//! - DomTree: one frame's element tree plus the queries the collectors need
//! - walker: depth-bounded recursive descent over element trees and JSON graphs

pub mod element;
pub mod tree;
pub mod walker;

pub use element::ElementNode;
pub use tree::DomTree;
pub use walker::{walk, walk_values, DEFAULT_DOM_DEPTH, DEFAULT_STATE_DEPTH};

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Extract the main frame's tree from a browser tab
pub fn extract_dom(tab: &Arc<Tab>) -> Result<DomTree> {
    DomTree::from_tab(tab)
}

/// Extract one tree per same-origin frame
pub fn extract_frames(tab: &Arc<Tab>) -> Result<Vec<DomTree>> {
    DomTree::from_frames(tab)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_export() {
        let element = ElementNode::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_dom_tree_export() {
        let root = ElementNode::new("body");
        let tree = DomTree::new(root);
        assert_eq!(tree.root.tag_name, "body");
    }
}
