//! Task Repository Module
//!
//! Core CRUD in `task_repo`, position management in `task_positioning`.

mod task_positioning;
mod task_repo;

pub use task_positioning::TaskPositioningOperations;
pub use task_repo::TaskRepository;
