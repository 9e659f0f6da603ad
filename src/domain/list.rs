//! List Entity
//!
//! A column entry on the board holding tasks. Lists are laid out in a
//! fixed number of visual columns; `order` is dense and 0-based within
//! the list's column.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A task list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    /// Unique identifier (database-assigned)
    pub id: u64,
    /// Display name; empty means unnamed
    pub name: String,
    /// Row position within the column (dense, 0-based)
    pub order: i64,
    /// Which visual column the list belongs to
    pub column_index: i64,
    /// Set while the list is archived
    pub archived_at: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl List {
    pub fn new(id: u64, name: String, column_index: i64, order: i64) -> Self {
        Self {
            id,
            name,
            order,
            column_index,
            archived_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Entity for List {
    type Id = u64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_creation() {
        let list = List::new(3, "Work".to_string(), 1, 0);
        assert_eq!(list.id(), 3);
        assert_eq!(list.column_index, 1);
        assert!(!list.is_archived());
    }
}
