use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a DOM element node
///
/// The shape mirrors what the page-side serialization script emits: tag name,
/// attributes, the element's direct text, element children, and the children of
/// an attached open shadow root. Closed shadow roots are invisible to the
/// serializer and therefore absent here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "a", "material-select-item")
    pub tag_name: String,

    /// Element attributes (id, class, href, data-*, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text directly inside the element (child text nodes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Children of the element's open shadow root, if one is attached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shadow_root: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
            shadow_root: Vec::new(),
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: set shadow root children
    pub fn with_shadow_root(mut self, shadow_children: Vec<ElementNode>) -> Self {
        self.shadow_root = shadow_children;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        if let Some(classes) = self.attributes.get("class") {
            classes.split_whitespace().any(|c| c == class_name)
        } else {
            false
        }
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether an open shadow root is attached
    pub fn has_shadow_root(&self) -> bool {
        !self.shadow_root.is_empty()
    }
}
