//! Task Entity
//!
//! A card on the board. Tasks live inside a list and carry a dense
//! 0-based position among the list's non-archived tasks.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

/// Task completion / lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Unchecked,
    Checked,
    /// Removed from the board but kept in storage; stamps `archived_at`
    Archived,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Unchecked => "unchecked",
            TaskStatus::Checked => "checked",
            TaskStatus::Archived => "archived",
        }
    }

    /// Parse a stored status string. Unknown values are rejected rather
    /// than defaulted so a bad write can never be laundered into a valid
    /// status on the way back out of the database.
    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "unchecked" => Ok(TaskStatus::Unchecked),
            "checked" => Ok(TaskStatus::Checked),
            "archived" => Ok(TaskStatus::Archived),
            other => Err(DomainError::InvalidInput(format!(
                "unknown task status: {}",
                other
            ))),
        }
    }
}

/// A task card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (database-assigned)
    pub id: u64,
    /// Card text; empty means a "blank" card, preserved verbatim
    pub text: String,
    /// Owning list
    pub list_id: u64,
    /// Position within the list's non-archived tasks (dense, 0-based)
    pub order: i64,
    pub status: TaskStatus,
    /// Set exactly while `status == Archived`, cleared otherwise
    pub archived_at: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Task {
    /// Create a new task at the given position in a list
    pub fn new(id: u64, list_id: u64, text: String, order: i64) -> Self {
        Self {
            id,
            text,
            list_id,
            order,
            status: TaskStatus::Unchecked,
            archived_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == TaskStatus::Archived
    }
}

impl Entity for Task {
    type Id = u64;

    fn id(&self) -> Self::Id {
        self.id
    }
}
