//! List Repository Module
//!
//! Core CRUD in `list_repo`, position management in `list_positioning`.

mod list_positioning;
mod list_repo;

pub use list_positioning::ListPositioningOperations;
pub use list_repo::ListRepository;
