//! Services a host element tree provides to the adapter.
//!
//! The tracker never walks a concrete DOM. Everything it needs (parent
//! lookup, child enumeration, ids and offsets) comes through these traits,
//! so any tree that can answer them can host draggable containers.

use kurbo::Point;

/// The kind of a node in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node itself.
    Document,
    /// An element that can carry ids, classes and offsets.
    Element,
    /// A text node (skipped by descendant scans).
    Text,
    /// A comment node (skipped by descendant scans).
    Comment,
}

impl NodeKind {
    /// Check if descendant scans should look at this node.
    pub fn is_scannable(self) -> bool {
        !matches!(self, NodeKind::Text | NodeKind::Comment)
    }
}

/// How far up the offset-parent chain an offset query walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// The element's own offset plus its immediate offset parent's.
    #[default]
    OneLevel,
    /// The full offset-parent chain, i.e. the offset from the document root.
    ToRoot,
}

/// Navigation over the host tree.
pub trait ElementTree {
    /// Handle to a node in the host tree.
    type Element: Copy + Eq;

    /// Get the kind of a node.
    fn node_kind(&self, el: Self::Element) -> NodeKind;

    /// Get the parent of a node, if attached.
    fn parent(&self, el: Self::Element) -> Option<Self::Element>;

    /// Get the direct children of a node, in document order.
    fn children(&self, el: Self::Element) -> Vec<Self::Element>;

    /// Check if a node is the root at which upward walks stop.
    fn is_root(&self, el: Self::Element) -> bool;
}

/// Stable string ids for host elements.
pub trait IdentityService: ElementTree {
    /// Get the id of an element.
    ///
    /// When the element has no id and `create` is true, `hint` (or a
    /// generated id when there is no hint) is assigned and returned. When
    /// `create` is false nothing is allocated and `None` comes back.
    fn get_id(&mut self, el: Self::Element, hint: Option<&str>, create: bool) -> Option<String>;
}

/// Cumulative pixel offsets.
pub trait OffsetQuery: ElementTree {
    /// Get the offset of an element.
    fn offset(&self, el: Self::Element, mode: OffsetMode) -> Point;
}

/// Resolution of ids back to elements.
pub trait ElementLookup: ElementTree {
    /// Find the element carrying `id`.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
}

/// Everything the drag tracker needs from its host.
pub trait DragHost: IdentityService + OffsetQuery + ElementLookup {}

impl<T> DragHost for T where T: IdentityService + OffsetQuery + ElementLookup {}
