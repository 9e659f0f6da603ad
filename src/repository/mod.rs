//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod list;
mod task;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{init_db, DbConnection};
pub use list::{ListPositioningOperations, ListRepository};
pub use task::{TaskPositioningOperations, TaskRepository};
pub use traits::Repository;
