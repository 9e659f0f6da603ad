//! boardkit
//!
//! Headless coordination engine for a column-grouped task board:
//! ordering math, a SQLite-backed store, staged drag state shared by
//! pointer and keyboard flows, and focus restitution after DOM churn.
//!
//! The crate has no rendering layer. A UI wires a [`board::Board`],
//! hands it a [`focus::FocusHost`], forwards pointer events to the
//! [`drag::pointer::PointerDragAdapter`] and key events to the
//! [`drag::keyboard::KeyboardDragEngine`], and re-renders from the
//! [`drag::state::DragStateManager`] snapshots it subscribes to.

pub mod board;
pub mod config;
pub mod domain;
pub mod drag;
pub mod focus;
pub mod layout;
pub mod repository;

pub use board::Board;
pub use config::BoardConfig;
pub use domain::{DomainError, DomainResult, List, Task, TaskStatus};
pub use drag::{DragKind, DragSession};
pub use focus::{FocusHost, FocusTarget};
