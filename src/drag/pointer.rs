//! Pointer Drag Adapter
//!
//! Wraps the external pointer/touch drag library behind a neutral
//! begin/consider/finalize interface. The library mutates the DOM on its
//! own (placeholders, shadow elements), so item order is reconstructed
//! from the per-element stable id attribute rather than trusted from
//! events. On a cross-zone drop both zones receive finalize; only the
//! destination produces an order to persist, the source is a no-op, so
//! there is exactly one writer per drop.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::Entity;

use super::state::{ContainerId, DragStateManager};
use super::DragKind;

/// Visual affordance the wrapped library should use while hovering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropStyle {
    #[default]
    Outline,
    Ghost,
}

/// Configuration for one droppable container
#[derive(Debug, Clone)]
pub struct DragZoneConfig {
    pub zone_id: ContainerId,
    pub kind: DragKind,
    pub drop_style: DropStyle,
}

/// A container with drag behavior attached
#[derive(Debug, Clone)]
pub struct DragZone {
    pub config: DragZoneConfig,
}

/// A consider/finalize event from the wrapped library.
///
/// `dom_children` is the zone's child order after the library's DOM
/// manipulation: the stable id attribute per element, `None` for
/// library-injected elements (placeholders) that carry no id.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub origin_zone: ContainerId,
    pub dest_zone: ContainerId,
    pub dom_children: Vec<Option<u64>>,
}

impl PointerEvent {
    pub fn is_cross_zone(&self) -> bool {
        self.origin_zone != self.dest_zone
    }
}

/// Neutral wrapper over the external drag library for one item kind
pub struct PointerDragAdapter<T: Entity<Id = u64>> {
    drag: Arc<DragStateManager<T>>,
}

impl<T: Entity<Id = u64>> PointerDragAdapter<T> {
    pub fn new(drag: Arc<DragStateManager<T>>) -> Self {
        Self { drag }
    }

    /// Attach drag behavior to a container
    pub fn create_drag_zone(&self, config: DragZoneConfig) -> DragZone {
        DragZone { config }
    }

    /// The library started a drag originating in `zone`
    pub fn on_begin(&self, zone: &DragZone) {
        self.drag.start_drag(zone.config.zone_id, zone.config.zone_id);
    }

    /// Visual-feedback reorder while hovering; staging only, nothing is
    /// persisted. Returns the reconstructed item order.
    pub fn on_consider(&self, zone: &DragZone, event: &PointerEvent, known: &[T]) -> Vec<u64> {
        if event.is_cross_zone() {
            // The item is leaving or entering this zone mid-drag
            self.drag.start_drag(event.origin_zone, event.dest_zone);
        }
        let ids = reconstruct_order(&event.dom_children, known);
        self.drag
            .update_during_drag(zone.config.zone_id, select_items(&ids, known));
        ids
    }

    /// The drop landed. The destination zone returns the final order for
    /// the caller to persist; the source side of a cross-zone drop
    /// returns `None` and writes nothing.
    pub fn on_finalize(
        &self,
        zone: &DragZone,
        event: &PointerEvent,
        known: &[T],
    ) -> Option<Vec<u64>> {
        if event.dest_zone != zone.config.zone_id {
            return None;
        }
        let ids = reconstruct_order(&event.dom_children, known);
        self.drag
            .update_during_drag(zone.config.zone_id, select_items(&ids, known));
        self.drag
            .complete_drag(event.origin_zone, event.dest_zone, true);
        Some(ids)
    }
}

/// Keep elements that carry a stable id attribute and are known to
/// application state, in DOM order, first occurrence wins. Placeholders
/// (no id) and shadow duplicates the library injected are dropped.
fn reconstruct_order<T: Entity<Id = u64>>(dom_children: &[Option<u64>], known: &[T]) -> Vec<u64> {
    let known_ids: HashSet<u64> = known.iter().map(|item| item.id()).collect();
    let mut seen = HashSet::new();
    dom_children
        .iter()
        .filter_map(|id| *id)
        .filter(|id| known_ids.contains(id) && seen.insert(*id))
        .collect()
}

fn select_items<T: Entity<Id = u64>>(ids: &[u64], known: &[T]) -> Vec<T> {
    ids.iter()
        .filter_map(|id| known.iter().find(|item| item.id() == *id).cloned())
        .collect()
}
