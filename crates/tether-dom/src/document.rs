//! In-memory document and its host service implementations.

use kurbo::Point;
use std::collections::HashMap;
use tether_core::config::DEFAULT_ID_PREFIX;
use tether_core::{ElementLookup, ElementTree, IdentityService, NodeKind, OffsetMode, OffsetQuery};
use uuid::Uuid;

use crate::class_list;
use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Namespace, Node, NodeData, NodeId};
use crate::target::Target;

/// An element tree with a document node and a body.
///
/// There is no layout engine: an element's offset within its offset parent
/// is whatever was last set through [`Document::set_position`] or
/// [`Document::set_layout_offset`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    /// Ids of elements attached to the document.
    ids: HashMap<String, NodeId>,
    id_prefix: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only a body.
    pub fn new() -> Self {
        Self::with_id_prefix(DEFAULT_ID_PREFIX)
    }

    /// Create a document whose generated ids start with `prefix`.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
            body: NodeId(0),
            ids: HashMap::new(),
            id_prefix: prefix.into(),
        };
        let body = doc.create_element("body");
        doc.nodes[body.0].parent = Some(doc.root);
        doc.nodes[doc.root.0].children.push(body);
        doc.body = body;
        doc
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The body element, root of all content.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.nodes
            .get(id.0)
            .and_then(Node::as_element)
            .ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.nodes
            .get_mut(id.0)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::NotAnElement(id))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.create_element_ns(Namespace::Html, tag_name)
    }

    /// Create a detached element in `namespace`.
    pub fn create_element_ns(&mut self, namespace: Namespace, tag_name: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::with_namespace(namespace, tag_name)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Check if a node is attached to the document.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.nodes.get(node.0).and_then(|n| n.parent);
        }
        false
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if child.0 >= self.nodes.len() {
            return Err(DomError::NotFound(format!("{:?}", child)));
        }
        self.element(parent)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle(child));
        }

        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        if self.is_connected(parent) {
            self.index_subtree(child);
        }
        Ok(())
    }

    /// Append a node to the body.
    pub fn append_to_root(&mut self, child: NodeId) -> DomResult<()> {
        self.append_child(self.body, child)
    }

    /// Detach a node (and its subtree) from its parent. Detached nodes are
    /// no longer found by id.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id.0).and_then(|n| n.parent) else {
            return;
        };
        if self.is_connected(id) {
            self.unindex_subtree(id);
        }
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        out
    }

    fn index_subtree(&mut self, id: NodeId) {
        for n in self.subtree(id) {
            if let Some(el_id) = self.nodes[n.0].as_element().and_then(|e| e.id.clone()) {
                self.ids.insert(el_id, n);
            }
        }
    }

    fn unindex_subtree(&mut self, id: NodeId) {
        for n in self.subtree(id) {
            if let Some(el_id) = self.nodes[n.0].as_element().and_then(|e| e.id.as_deref()) {
                if self.ids.get(el_id) == Some(&n) {
                    self.ids.remove(el_id);
                }
            }
        }
    }

    /// Find an attached element by id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Resolve a target to the first element it names.
    pub fn get_dom_element(&self, target: &Target) -> DomResult<NodeId> {
        self.resolve(target)?
            .into_iter()
            .next()
            .ok_or_else(|| DomError::NotFound("empty target".to_string()))
    }

    /// Resolve a target to every element it names.
    pub fn resolve(&self, target: &Target) -> DomResult<Vec<NodeId>> {
        match target {
            Target::Node(id) => {
                self.element(*id)?;
                Ok(vec![*id])
            }
            Target::Id(id) => self
                .get_element_by_id(id)
                .map(|n| vec![n])
                .ok_or_else(|| DomError::NotFound(id.clone())),
            Target::Many(targets) => {
                let mut out = Vec::with_capacity(targets.len());
                for t in targets {
                    out.extend(self.resolve(t)?);
                }
                Ok(out)
            }
        }
    }

    /// Get the id of an element, if it has one.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().and_then(|e| e.id.as_deref())
    }

    /// Set (or clear) the id of an element.
    pub fn set_element_id(&mut self, node: NodeId, id: Option<&str>) -> DomResult<()> {
        let connected = self.is_connected(node);
        let element = self.element_mut(node)?;
        let old = std::mem::replace(&mut element.id, id.map(str::to_string));
        if connected {
            if let Some(old) = old {
                if self.ids.get(&old) == Some(&node) {
                    self.ids.remove(&old);
                }
            }
            if let Some(id) = id {
                self.ids.insert(id.to_string(), node);
            }
        }
        Ok(())
    }

    fn generate_id(&self) -> String {
        format!("{}_{}", self.id_prefix, Uuid::new_v4().simple())
    }

    /// Read an attribute. `id` and `class` map to the element's id and
    /// class name.
    pub fn get_attribute(&self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        let element = self.element(node)?;
        Ok(match name {
            "id" => element.id.clone(),
            "class" => Some(element.class_name().to_string()).filter(|c| !c.is_empty()),
            _ => element.attributes.get(name).cloned(),
        })
    }

    /// Write an attribute.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        match name {
            "id" => self.set_element_id(node, Some(value)),
            "class" => self.set_class_name(node, value),
            _ => {
                self.element_mut(node)?
                    .attributes
                    .insert(name.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    /// Get the raw class string of an element.
    pub fn class_name(&self, node: NodeId) -> DomResult<&str> {
        Ok(self.element(node)?.class_name())
    }

    /// Replace the class string of an element, trimmed.
    pub fn set_class_name(&mut self, node: NodeId, class_name: &str) -> DomResult<()> {
        self.element_mut(node)?.set_class_name(class_name);
        Ok(())
    }

    /// Add and remove class tokens on one element.
    pub(crate) fn update_classes(&mut self, node: NodeId, classes: &str, add: bool) -> DomResult<()> {
        let element = self.element_mut(node)?;
        let updated = if add {
            class_list::add(element.class_name(), classes)
        } else {
            class_list::remove(element.class_name(), classes)
        };
        element.set_class_name(&updated);
        Ok(())
    }

    /// Write an element's position as pixel style values. The layout box
    /// follows the inline style.
    pub fn set_position(&mut self, node: NodeId, position: Point) -> DomResult<()> {
        let element = self.element_mut(node)?;
        element.style.left = Some(format!("{}px", position.x));
        element.style.top = Some(format!("{}px", position.y));
        element.layout.offset_left = position.x;
        element.layout.offset_top = position.y;
        Ok(())
    }

    /// Read an element's position back from its style. Unset or malformed
    /// values read as 0.
    pub fn get_position(&self, node: NodeId) -> DomResult<Point> {
        fn pixels(value: Option<&str>) -> f64 {
            value
                .and_then(|v| v.trim().strip_suffix("px"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0)
        }

        let style = &self.element(node)?.style;
        Ok(Point::new(
            pixels(style.left.as_deref()),
            pixels(style.top.as_deref()),
        ))
    }

    /// Set an element's offset within its offset parent without touching
    /// its inline style.
    pub fn set_layout_offset(&mut self, node: NodeId, offset: Point) -> DomResult<()> {
        let layout = &mut self.element_mut(node)?.layout;
        layout.offset_left = offset.x;
        layout.offset_top = offset.y;
        Ok(())
    }

    /// Override an element's offset parent. `None` restores the default
    /// (nearest ancestor element).
    ///
    /// A parent whose own offset-parent chain leads back to `node` (the node
    /// itself, one of its descendants, or an explicit loop) is rejected.
    pub fn set_offset_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> DomResult<()> {
        self.element(node)?;
        if let Some(p) = parent {
            self.element(p)?;
            if p == node || self.offset_chain(p).contains(&node) {
                return Err(DomError::Cycle(node));
            }
        }
        self.element_mut(node)?.layout.offset_parent = parent;
        Ok(())
    }

    /// Offset parents of `node`, nearest first. The walk stops after one
    /// pass over the arena, so a loop introduced by later tree edits cannot
    /// keep it going.
    fn offset_chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut parent = self.offset_parent(node);
        while let Some(p) = parent {
            if chain.len() >= self.nodes.len() {
                log::warn!("Offset parent chain of {:?} loops", node);
                break;
            }
            chain.push(p);
            parent = self.offset_parent(p);
        }
        chain
    }

    /// Get the element offsets are measured from.
    pub fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        if node == self.body {
            return None;
        }
        let element = self.element(node).ok()?;
        if let Some(parent) = element.layout.offset_parent {
            return Some(parent);
        }

        let mut current = self.nodes[node.0].parent;
        while let Some(n) = current {
            if self.nodes[n.0].is_element() {
                return Some(n);
            }
            current = self.nodes[n.0].parent;
        }
        None
    }

    /// Cumulative offset of an element.
    ///
    /// [`OffsetMode::OneLevel`] adds only the immediate offset parent's
    /// offset; [`OffsetMode::ToRoot`] walks the whole offset-parent chain.
    pub fn get_offset(&self, node: NodeId, mode: OffsetMode) -> Point {
        let Ok(element) = self.element(node) else {
            return Point::ZERO;
        };
        let mut offset = Point::new(element.layout.offset_left, element.layout.offset_top);

        let parents = match mode {
            OffsetMode::ToRoot => self.offset_chain(node),
            OffsetMode::OneLevel => self.offset_parent(node).into_iter().collect(),
        };
        for p in parents {
            if let Ok(el) = self.element(p) {
                offset.x += el.layout.offset_left;
                offset.y += el.layout.offset_top;
            }
        }
        offset
    }
}

impl ElementTree for Document {
    type Element = NodeId;

    fn node_kind(&self, el: NodeId) -> NodeKind {
        match self.nodes.get(el.0).map(|n| &n.data) {
            Some(NodeData::Element(_)) => NodeKind::Element,
            Some(NodeData::Text(_)) => NodeKind::Text,
            Some(NodeData::Comment(_)) => NodeKind::Comment,
            Some(NodeData::Document) | None => NodeKind::Document,
        }
    }

    fn parent(&self, el: NodeId) -> Option<NodeId> {
        self.nodes.get(el.0).and_then(|n| n.parent)
    }

    fn children(&self, el: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(el.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn is_root(&self, el: NodeId) -> bool {
        el == self.body || el == self.root
    }
}

impl IdentityService for Document {
    fn get_id(&mut self, el: NodeId, hint: Option<&str>, create: bool) -> Option<String> {
        let existing = self.element(el).ok()?.id.clone();
        if existing.is_some() || !create {
            return existing;
        }

        // A hint already used by another attached element is not reused.
        let id = match hint {
            Some(hint) if self.ids.get(hint).is_none_or(|&owner| owner == el) => hint.to_string(),
            _ => self.generate_id(),
        };
        self.set_element_id(el, Some(&id)).ok()?;
        log::trace!("Assigned id {} to {:?}", id, el);
        Some(id)
    }
}

impl OffsetQuery for Document {
    fn offset(&self, el: NodeId, mode: OffsetMode) -> Point {
        self.get_offset(el, mode)
    }
}

impl ElementLookup for Document {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(doc: &mut Document, parent: NodeId, id: &str, x: f64, y: f64) -> NodeId {
        let el = doc.create_element("div");
        doc.set_element_id(el, Some(id)).unwrap();
        doc.set_position(el, Point::new(x, y)).unwrap();
        doc.append_child(parent, el).unwrap();
        el
    }

    #[test]
    fn test_ids_only_resolve_when_attached() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_element_id(el, Some("node")).unwrap();
        assert_eq!(doc.get_element_by_id("node"), None);

        doc.append_to_root(el).unwrap();
        assert_eq!(doc.get_element_by_id("node"), Some(el));

        doc.remove(el);
        assert_eq!(doc.get_element_by_id("node"), None);
    }

    #[test]
    fn test_append_child_reparents() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = positioned(&mut doc, body, "a", 0.0, 0.0);
        let b = positioned(&mut doc, body, "b", 0.0, 0.0);
        let c = positioned(&mut doc, a, "c", 0.0, 0.0);

        doc.append_child(b, c).unwrap();
        assert!(doc.node(a).unwrap().children.is_empty());
        assert_eq!(doc.parent(c), Some(b));
        assert_eq!(doc.get_element_by_id("c"), Some(c));
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = positioned(&mut doc, body, "a", 0.0, 0.0);
        let b = positioned(&mut doc, a, "b", 0.0, 0.0);
        assert_eq!(doc.append_child(b, a), Err(DomError::Cycle(a)));

        let text = doc.create_text("hi");
        assert_eq!(doc.append_child(text, a), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn test_offset_modes() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = positioned(&mut doc, body, "outer", 100.0, 50.0);
        let middle = positioned(&mut doc, outer, "middle", 10.0, 10.0);
        let inner = positioned(&mut doc, middle, "inner", 1.0, 2.0);

        assert_eq!(doc.get_offset(inner, OffsetMode::OneLevel), Point::new(11.0, 12.0));
        assert_eq!(doc.get_offset(inner, OffsetMode::ToRoot), Point::new(111.0, 62.0));
        assert_eq!(doc.get_offset(body, OffsetMode::ToRoot), Point::ZERO);
    }

    #[test]
    fn test_explicit_offset_parent() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = positioned(&mut doc, body, "outer", 100.0, 100.0);
        let static_box = doc.create_element("div");
        doc.append_child(outer, static_box).unwrap();
        doc.set_layout_offset(static_box, Point::new(5.0, 5.0)).unwrap();
        let inner = positioned(&mut doc, static_box, "inner", 20.0, 20.0);

        doc.set_offset_parent(inner, Some(outer)).unwrap();
        assert_eq!(doc.get_offset(inner, OffsetMode::ToRoot), Point::new(120.0, 120.0));
    }

    #[test]
    fn test_offset_parent_rejects_cycle() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = positioned(&mut doc, body, "a", 10.0, 10.0);
        let b = positioned(&mut doc, a, "b", 5.0, 5.0);
        let c = positioned(&mut doc, body, "c", 1.0, 1.0);

        assert_eq!(doc.set_offset_parent(a, Some(a)), Err(DomError::Cycle(a)));
        assert_eq!(doc.set_offset_parent(a, Some(b)), Err(DomError::Cycle(a)));

        doc.set_offset_parent(c, Some(b)).unwrap();
        assert_eq!(doc.set_offset_parent(a, Some(c)), Err(DomError::Cycle(a)));
        assert_eq!(doc.get_offset(b, OffsetMode::ToRoot), Point::new(15.0, 15.0));
        assert_eq!(doc.get_offset(c, OffsetMode::ToRoot), Point::new(16.0, 16.0));
    }

    #[test]
    fn test_offset_walk_survives_loop_from_tree_edits() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = positioned(&mut doc, body, "a", 10.0, 10.0);
        let b = positioned(&mut doc, body, "b", 5.0, 5.0);

        // Accepted while b is a sibling; moving a under b closes a loop.
        doc.set_offset_parent(b, Some(a)).unwrap();
        doc.append_child(b, a).unwrap();

        let offset = doc.get_offset(a, OffsetMode::ToRoot);
        assert!(offset.x.is_finite() && offset.y.is_finite());
    }

    #[test]
    fn test_svg_class_lives_in_attribute() {
        let mut doc = Document::new();
        let path = doc.create_element_ns(Namespace::Svg, "path");
        doc.append_to_root(path).unwrap();

        doc.set_class_name(path, " connector ").unwrap();
        doc.update_classes(path, "hover", true).unwrap();

        let element = doc.node(path).unwrap().as_element().unwrap();
        assert_eq!(element.namespace, Namespace::Svg);
        assert!(element.class_name.is_empty());
        assert_eq!(element.attributes.get("class").map(String::as_str), Some("connector hover"));
        assert_eq!(doc.get_attribute(path, "class").unwrap().as_deref(), Some("connector hover"));
    }

    #[test]
    fn test_get_id_hint_collision() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = positioned(&mut doc, body, "a", 0.0, 0.0);
        let b = doc.create_element("div");
        doc.append_to_root(b).unwrap();

        let id = doc.get_id(b, Some("a"), true).unwrap();
        assert_ne!(id, "a");
        assert_eq!(doc.get_element_by_id("a"), Some(a));
        assert_eq!(doc.get_element_by_id(&id), Some(b));
    }

    #[test]
    fn test_position_round_trip_and_defaults() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        assert_eq!(doc.get_position(el).unwrap(), Point::ZERO);

        doc.set_position(el, Point::new(12.5, 40.0)).unwrap();
        assert_eq!(doc.get_position(el).unwrap(), Point::new(12.5, 40.0));
        let style = &doc.node(el).unwrap().as_element().unwrap().style;
        assert_eq!(style.left.as_deref(), Some("12.5px"));
        assert_eq!(style.top.as_deref(), Some("40px"));
    }

    #[test]
    fn test_get_id_generation() {
        let mut doc = Document::with_id_prefix("diagram");
        let el = doc.create_element("div");
        doc.append_to_root(el).unwrap();

        assert_eq!(doc.get_id(el, None, false), None);
        let id = doc.get_id(el, None, true).unwrap();
        assert!(id.starts_with("diagram_"));
        assert_eq!(doc.get_id(el, Some("ignored"), true), Some(id.clone()));
        assert_eq!(doc.get_element_by_id(&id), Some(el));

        let hinted = doc.create_element("div");
        assert_eq!(doc.get_id(hinted, Some("chosen"), true).as_deref(), Some("chosen"));

        let text = doc.create_text("x");
        assert_eq!(doc.get_id(text, None, true), None);
    }

    #[test]
    fn test_attributes() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.append_to_root(el).unwrap();

        doc.set_attribute(el, "data-port", "left").unwrap();
        doc.set_attribute(el, "id", "n1").unwrap();
        doc.set_attribute(el, "class", " box ").unwrap();

        assert_eq!(doc.get_attribute(el, "data-port").unwrap().as_deref(), Some("left"));
        assert_eq!(doc.get_attribute(el, "id").unwrap().as_deref(), Some("n1"));
        assert_eq!(doc.get_attribute(el, "class").unwrap().as_deref(), Some("box"));
        assert_eq!(doc.get_attribute(el, "missing").unwrap(), None);
        assert_eq!(doc.get_element_by_id("n1"), Some(el));
    }
}
