//! Records kept by the drag tracker.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A descendant element with endpoints, tracked under a draggable ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedChild {
    /// Id of the tracked element.
    pub id: String,
    /// Offset from the owning draggable's top-left corner at last update.
    pub offset: Vec2,
}

impl TrackedChild {
    pub fn new(id: impl Into<String>, offset: Vec2) -> Self {
        Self {
            id: id.into(),
            offset,
        }
    }

    /// Absolute position of this child when its draggable sits at `origin`.
    pub fn position_from(&self, origin: Point) -> Point {
        origin + self.offset
    }
}

/// Tracked children of one draggable, keyed by child id.
pub type ChildMap = HashMap<String, TrackedChild>;

/// The part of a connection endpoint the tracker cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Id of the element the endpoint is attached to.
    pub element_id: String,
}

impl EndpointRecord {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }
}
