//! List Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for List CRUD operations.
//! Position management (reorder, cross-column move) lives in
//! `list_positioning`.

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::super::db::DbConnection;
use super::super::traits::Repository;
use crate::domain::{DomainError, DomainResult, List};

const LIST_COLUMNS: &str =
    "id, name, position, column_index, archived_at, created_at, updated_at";

/// SQLite implementation of List repository
pub struct ListRepository {
    pub(super) conn: DbConnection,
}

impl ListRepository {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }

    /// All non-archived lists, ordered by column then position (ties by id)
    pub async fn list_active(&self) -> DomainResult<Vec<List>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists WHERE archived_at IS NULL \
                 ORDER BY column_index, position, id",
                LIST_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut lists = Vec::new();
        for row in rows {
            lists.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        Ok(lists)
    }

    /// Non-archived lists of one column, ordered by position
    pub async fn list_in_column(&self, column_index: i64) -> DomainResult<Vec<List>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists WHERE column_index = ? AND archived_at IS NULL \
                 ORDER BY position, id",
                LIST_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![column_index], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut lists = Vec::new();
        for row in rows {
            lists.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        Ok(lists)
    }

    /// Append a new list at the bottom of a column. Whitespace-only names
    /// collapse to empty (an unnamed list).
    pub async fn create_list(&self, column_index: i64, name: &str) -> DomainResult<List> {
        let name = if name.trim().is_empty() { "" } else { name };
        let now = chrono::Utc::now().timestamp_millis();

        let conn = self.conn.lock().await;
        let position: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM lists \
                 WHERE column_index = ? AND archived_at IS NULL",
                params![column_index],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        conn.execute(
            "INSERT INTO lists (name, position, column_index, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![name, position, column_index, now, now],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        let id = conn.last_insert_rowid() as u64;
        let mut list = List::new(id, name.to_string(), column_index, position);
        list.created_at = Some(now);
        list.updated_at = Some(now);
        Ok(list)
    }

    /// Archive or restore a list
    pub async fn set_archived(&self, id: u64, archived: bool) -> DomainResult<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let archived_at = if archived { Some(now) } else { None };

        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE lists SET archived_at = ?, updated_at = ? WHERE id = ?",
                params![archived_at, now, id as i64],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("List {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<List> for ListRepository {
    async fn create(&self, entity: &List) -> DomainResult<List> {
        self.create_list(entity.column_index, &entity.name).await
    }

    async fn find_by_id(&self, id: u64) -> DomainResult<Option<List>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![id as i64], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<List>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists ORDER BY column_index, position, id",
                LIST_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut lists = Vec::new();
        for row in rows {
            lists.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        Ok(lists)
    }

    async fn update(&self, entity: &List) -> DomainResult<List> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE lists SET name = ?, position = ?, column_index = ?, \
                 archived_at = ?, updated_at = ? WHERE id = ?",
                params![
                    entity.name,
                    entity.order,
                    entity.column_index,
                    entity.archived_at,
                    now,
                    entity.id as i64
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("List {} not found", entity.id)));
        }
        let mut updated = entity.clone();
        updated.updated_at = Some(now);
        Ok(updated)
    }

    /// Permanent removal; the list's tasks go with it
    async fn delete(&self, id: u64) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let tx = guard
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.execute("DELETE FROM tasks WHERE list_id = ?", params![id as i64])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        tx.execute("DELETE FROM lists WHERE id = ?", params![id as i64])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }
}

/// Convert a database row to List
pub(super) fn row_to_list(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        order: row.get(2)?,
        column_index: row.get(3)?,
        archived_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
