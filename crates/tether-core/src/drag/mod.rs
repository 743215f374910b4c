//! Drag ancestry tracking.
//!
//! When a container element is dragged, every descendant that carries
//! connection endpoints moves with it, and the connectors attached to those
//! descendants have to be repainted. Walking the element tree on every drag
//! to find them is expensive, so [`DragManager`] keeps, per draggable
//! container, the set of endpoint-bearing descendants and their offsets
//! relative to the container. After a drag the descendants' positions are a
//! translation of the cached offsets.
//!
//! The tracker is advisory cache state. Operations on unknown ids are
//! no-ops, never errors.

mod tracked;

pub use tracked::{ChildMap, EndpointRecord, TrackedChild};

use kurbo::{Point, Vec2};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::host::{DragHost, OffsetMode};

/// Tracks endpoint-bearing descendants of draggable containers.
///
/// One instance belongs to one diagram context. The host tree is not owned
/// by the tracker; it is passed to each operation that needs to query it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DragManager {
    /// Ids of registered draggables.
    draggables: HashSet<String>,
    /// Registered draggables in registration order.
    drag_list: Vec<String>,
    /// Tracked children per draggable.
    elements: HashMap<String, ChildMap>,
    /// Number of endpoints attached to each element.
    endpoint_counts: HashMap<String, u32>,
    /// Owning draggable of each tracked child.
    owners: HashMap<String, String>,
}

impl DragManager {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `el` as a draggable and track its endpoint-bearing
    /// descendants at any depth.
    ///
    /// Registering an element twice keeps the single registry entry but
    /// rescans its descendants. The scan does not enter the subtree of a
    /// nested draggable, since those descendants belong to the nearer one.
    pub fn register<H: DragHost>(&mut self, host: &mut H, el: H::Element) {
        let Some(id) = host.get_id(el, None, true) else {
            return;
        };

        if self.draggables.insert(id.clone()) {
            log::debug!("Registered draggable {}", id);
            self.drag_list.push(id.clone());
        }
        self.elements.entry(id.clone()).or_default();

        let origin = host.offset(el, OffsetMode::ToRoot);
        self.scan_descendants(host, el, &id, origin);
    }

    fn scan_descendants<H: DragHost>(
        &mut self,
        host: &mut H,
        parent: H::Element,
        owner: &str,
        origin: Point,
    ) {
        for child in host.children(parent) {
            if !host.node_kind(child).is_scannable() {
                continue;
            }

            let child_id = host.get_id(child, None, false);
            if let Some(cid) = &child_id {
                if self.endpoint_count(cid) > 0 {
                    let offset = host.offset(child, OffsetMode::ToRoot) - origin;
                    self.track(cid, owner, offset);
                }
                if cid != owner && self.draggables.contains(cid) {
                    continue;
                }
            }

            self.scan_descendants(host, child, owner, origin);
        }
    }

    /// Record `child_id` under `owner`, removing it from any previous owner.
    fn track(&mut self, child_id: &str, owner: &str, offset: Vec2) {
        if let Some(previous) = self.owners.get(child_id) {
            if previous != owner {
                log::debug!("Moving {} from draggable {} to {}", child_id, previous, owner);
                if let Some(children) = self.elements.get_mut(previous) {
                    children.remove(child_id);
                }
            }
        }

        self.elements
            .entry(owner.to_string())
            .or_default()
            .insert(child_id.to_string(), TrackedChild::new(child_id, offset));
        self.owners.insert(child_id.to_string(), owner.to_string());
    }

    /// Recompute the cached offsets of every child of draggable `element_id`
    /// from live host offsets.
    pub fn update_offsets<H: DragHost>(&mut self, host: &H, element_id: &str) {
        let Some(el) = host.element_by_id(element_id) else {
            return;
        };
        let child_ids: Vec<String> = match self.elements.get(element_id) {
            Some(children) if !children.is_empty() => children.keys().cloned().collect(),
            _ => return,
        };

        let origin = host.offset(el, OffsetMode::ToRoot);
        for cid in child_ids {
            let Some(child) = host.element_by_id(&cid) else {
                log::warn!("Tracked element {} of draggable {} not found", cid, element_id);
                continue;
            };
            let offset = host.offset(child, OffsetMode::ToRoot) - origin;
            log::trace!("Offset of {} under {} is now {:?}", cid, element_id, offset);
            self.track(&cid, element_id, offset);
        }
    }

    /// Note that an endpoint was attached to `el`.
    ///
    /// Walks up from the element's parent to the nearest registered
    /// draggable and tracks the element there, unless it already is. An
    /// element with no draggable ancestor stays untracked.
    pub fn endpoint_added<H: DragHost>(&mut self, host: &mut H, el: H::Element) {
        let Some(id) = host.get_id(el, None, true) else {
            return;
        };
        *self.endpoint_counts.entry(id.clone()).or_insert(0) += 1;

        let mut current = host.parent(el);
        while let Some(parent) = current {
            if host.is_root(parent) {
                break;
            }

            if let Some(pid) = host.get_id(parent, None, false) {
                if self.draggables.contains(&pid) {
                    let already_tracked = self
                        .elements
                        .get(&pid)
                        .is_some_and(|children| children.contains_key(&id));
                    if !already_tracked {
                        let offset = host.offset(el, OffsetMode::ToRoot)
                            - host.offset(parent, OffsetMode::ToRoot);
                        log::debug!("Tracking {} under draggable {}", id, pid);
                        self.track(&id, &pid, offset);
                    }
                    return;
                }
            }

            current = host.parent(parent);
        }
    }

    /// Note that an endpoint was removed. Once the owning element has no
    /// endpoints left it is dropped from every draggable.
    pub fn endpoint_deleted(&mut self, endpoint: &EndpointRecord) {
        let id = &endpoint.element_id;
        let Some(count) = self.endpoint_counts.get_mut(id) else {
            return;
        };

        *count = count.saturating_sub(1);
        if *count > 0 {
            return;
        }

        self.endpoint_counts.remove(id);
        // Clean every owner, not only the recorded one.
        for children in self.elements.values_mut() {
            children.remove(id);
        }
        self.owners.remove(id);
        log::debug!("Element {} has no endpoints left, untracked", id);
    }

    /// Move everything known under `old_id` to `new_id`.
    ///
    /// Afterwards `old_id` has an empty child map and no owner.
    pub fn change_id(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id {
            return;
        }

        match self.elements.remove(old_id) {
            Some(children) => {
                self.elements.insert(new_id.to_string(), children);
            }
            None => {
                self.elements.remove(new_id);
            }
        }
        self.elements.insert(old_id.to_string(), ChildMap::new());

        match self.owners.remove(old_id) {
            Some(owner) => {
                if let Some(mut entry) = self.elements.get_mut(&owner).and_then(|c| c.remove(old_id)) {
                    entry.id = new_id.to_string();
                    if let Some(children) = self.elements.get_mut(&owner) {
                        children.insert(new_id.to_string(), entry);
                    }
                }
                self.owners.insert(new_id.to_string(), owner);
            }
            None => {
                self.owners.remove(new_id);
            }
        }
        for owner in self.owners.values_mut() {
            if owner.as_str() == old_id {
                *owner = new_id.to_string();
            }
        }

        if let Some(count) = self.endpoint_counts.remove(old_id) {
            self.endpoint_counts.insert(new_id.to_string(), count);
        }

        if self.draggables.remove(old_id) {
            self.draggables.insert(new_id.to_string());
            for id in &mut self.drag_list {
                if id.as_str() == old_id {
                    *id = new_id.to_string();
                }
            }
        }

        log::debug!("Renamed {} to {}", old_id, new_id);
    }

    /// Get the tracked children of a draggable.
    pub fn get_elements_for_draggable(&self, id: &str) -> Option<&ChildMap> {
        self.elements.get(id)
    }

    /// Stop tracking an element that left the tree.
    pub fn element_removed(&mut self, element_id: &str) {
        if let Some(owner) = self.owners.remove(element_id) {
            if let Some(children) = self.elements.get_mut(&owner) {
                children.remove(element_id);
            }
        }
    }

    /// Note that a drag of `el` finished.
    ///
    /// Draggables can nest. If `el` is itself tracked under an outer
    /// draggable, the outer one's offsets are refreshed.
    pub fn drag_ended<H: DragHost>(&mut self, host: &mut H, el: H::Element) {
        let Some(id) = host.get_id(el, None, true) else {
            return;
        };
        if let Some(ancestor) = self.owners.get(&id).cloned() {
            self.update_offsets(host, &ancestor);
        }
    }

    /// Move a tracked element under a new parent, recomputing its offset.
    /// Untracked elements are left alone.
    pub fn set_parent<H: DragHost>(
        &mut self,
        host: &H,
        el: H::Element,
        el_id: &str,
        new_parent: H::Element,
        new_parent_id: &str,
    ) {
        let Some(current) = self.owners.get(el_id).cloned() else {
            return;
        };

        let mut entry = self
            .elements
            .get_mut(&current)
            .and_then(|children| children.remove(el_id))
            .unwrap_or_else(|| TrackedChild::new(el_id, Vec2::ZERO));
        entry.offset =
            host.offset(el, OffsetMode::ToRoot) - host.offset(new_parent, OffsetMode::ToRoot);

        self.elements
            .entry(new_parent_id.to_string())
            .or_default()
            .insert(el_id.to_string(), entry);
        self.owners.insert(el_id.to_string(), new_parent_id.to_string());
        log::debug!("Reparented {} from {} to {}", el_id, current, new_parent_id);
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.draggables.clear();
        self.drag_list.clear();
        self.elements.clear();
        self.endpoint_counts.clear();
        self.owners.clear();
    }

    /// Check if `id` is a registered draggable.
    pub fn is_draggable(&self, id: &str) -> bool {
        self.draggables.contains(id)
    }

    /// Registered draggables, in registration order.
    pub fn draggables(&self) -> &[String] {
        &self.drag_list
    }

    /// Get the draggable that `child_id` is tracked under.
    pub fn owner_of(&self, child_id: &str) -> Option<&str> {
        self.owners.get(child_id).map(String::as_str)
    }

    /// Number of endpoints currently attached to an element.
    pub fn endpoint_count(&self, id: &str) -> u32 {
        self.endpoint_counts.get(id).copied().unwrap_or(0)
    }

    /// Check if `id` is tracked under some draggable.
    pub fn is_tracked(&self, id: &str) -> bool {
        self.owners.contains_key(id)
    }

    /// Positions of a draggable's tracked children when the draggable sits
    /// at `origin`, sorted by child id.
    pub fn child_positions(&self, draggable_id: &str, origin: Point) -> Vec<(String, Point)> {
        let mut positions: Vec<(String, Point)> = self
            .elements
            .get(draggable_id)
            .map(|children| {
                children
                    .values()
                    .map(|child| (child.id.clone(), child.position_from(origin)))
                    .collect()
            })
            .unwrap_or_default();
        positions.sort_by(|a, b| a.0.cmp(&b.0));
        positions
    }

    /// Serialize the tracker state for diagnostics.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
