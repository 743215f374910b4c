//! Errors raised by the adapter surface.

use thiserror::Error;

use crate::node::NodeId;

/// DOM adapter errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Element not found: {0}")]
    NotFound(String),
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("Node {0:?} would become its own ancestor")]
    Cycle(NodeId),
}

/// Result type for adapter operations.
pub type DomResult<T> = Result<T, DomError>;
