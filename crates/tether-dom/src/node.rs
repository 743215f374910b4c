//! Node model for the in-memory element tree.
//!
//! Nodes live in the document's arena and are referenced by [`NodeId`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inline `left`/`top` style values, as written (e.g. `"12px"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub left: Option<String>,
    pub top: Option<String>,
}

/// Laid-out box of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    /// Offset from the offset parent's left edge.
    pub offset_left: f64,
    /// Offset from the offset parent's top edge.
    pub offset_top: f64,
    /// Explicit offset parent. `None` means the nearest ancestor element.
    pub offset_parent: Option<NodeId>,
}

/// Namespace an element was created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[default]
    Html,
    /// SVG elements keep their classes in the `class` attribute.
    Svg,
}

/// Data specific to element nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag_name: String,
    pub namespace: Namespace,
    pub id: Option<String>,
    /// Class string of HTML elements. Unused for SVG elements.
    pub class_name: String,
    pub attributes: HashMap<String, String>,
    pub style: InlineStyle,
    pub layout: LayoutBox,
}

impl ElementData {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self::with_namespace(Namespace::Html, tag_name)
    }

    pub fn with_namespace(namespace: Namespace, tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            namespace,
            id: None,
            class_name: String::new(),
            attributes: HashMap::new(),
            style: InlineStyle::default(),
            layout: LayoutBox::default(),
        }
    }

    /// The class string, read from wherever this element's namespace keeps it.
    pub fn class_name(&self) -> &str {
        match self.namespace {
            Namespace::Html => &self.class_name,
            Namespace::Svg => self.attributes.get("class").map_or("", String::as_str),
        }
    }

    /// Replace the class string, trimmed.
    pub fn set_class_name(&mut self, class_name: &str) {
        let class_name = class_name.trim().to_string();
        match self.namespace {
            Namespace::Html => self.class_name = class_name,
            Namespace::Svg if class_name.is_empty() => {
                self.attributes.remove("class");
            }
            Namespace::Svg => {
                self.attributes.insert("class".to_string(), class_name);
            }
        }
    }
}

/// The payload that distinguishes node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// A single node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a detached node.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}
