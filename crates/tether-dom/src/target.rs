//! Element targets accepted by the adapter surface.

use crate::node::NodeId;

/// One element, an element id, or a list of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    Id(String),
    Many(Vec<Target>),
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Id(id.to_string())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Id(id)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(ids: Vec<NodeId>) -> Self {
        Target::Many(ids.into_iter().map(Target::Node).collect())
    }
}

impl From<&[NodeId]> for Target {
    fn from(ids: &[NodeId]) -> Self {
        Target::Many(ids.iter().copied().map(Target::Node).collect())
    }
}

impl From<Vec<Target>> for Target {
    fn from(targets: Vec<Target>) -> Self {
        Target::Many(targets)
    }
}
