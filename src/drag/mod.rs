//! Drag Coordination Layer
//!
//! Three cooperating parts: a staging state manager that arbitrates
//! between the durable store and in-flight drags, a neutral adapter over
//! the external pointer drag library, and the keyboard drag engine's
//! pick-up / move / drop state machine.

pub mod keyboard;
pub mod pointer;
pub mod state;

use serde::{Deserialize, Serialize};

use crate::focus::FocusTarget;

/// What kind of item a drag moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Task,
    List,
}

/// A keyboard drag in progress. Created on pick-up, mutated as movement
/// keys relocate the item, destroyed on drop or cancel.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: DragKind,
    pub item_id: u64,
    /// Container the item was picked up from
    pub source_container: state::ContainerId,
    /// Container the item currently sits in
    pub current_container: state::ContainerId,
    /// Focus identity handed to the focus coordinator on drop
    pub origin: FocusTarget,
}
