//! Task Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Task CRUD operations.
//! Position management (reorder, cross-list move) lives in
//! `task_positioning`.

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::super::db::DbConnection;
use super::super::traits::Repository;
use crate::domain::{DomainError, DomainResult, Task, TaskStatus};

const TASK_COLUMNS: &str =
    "id, text, list_id, position, status, archived_at, created_at, updated_at";

/// SQLite implementation of Task repository
pub struct TaskRepository {
    pub(super) conn: DbConnection,
}

impl TaskRepository {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }

    /// Non-archived tasks of a list, ordered by position (ties by id)
    pub async fn list_for(&self, list_id: u64) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tasks WHERE list_id = ? AND status != 'archived' \
                 ORDER BY position, id",
                TASK_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![list_id as i64], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        Ok(tasks)
    }

    /// Append a new task at the end of a list.
    ///
    /// Whitespace-only text collapses to empty; an empty card is a valid
    /// "blank" task and is stored verbatim, never rejected.
    pub async fn create_task(&self, list_id: u64, text: &str) -> DomainResult<Task> {
        let text = if text.trim().is_empty() { "" } else { text };
        let now = chrono::Utc::now().timestamp_millis();

        let conn = self.conn.lock().await;
        let position: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM tasks \
                 WHERE list_id = ? AND status != 'archived'",
                params![list_id as i64],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        conn.execute(
            "INSERT INTO tasks (text, list_id, position, status, created_at, updated_at) \
             VALUES (?, ?, ?, 'unchecked', ?, ?)",
            params![text, list_id as i64, position, now, now],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        let id = conn.last_insert_rowid() as u64;
        let mut task = Task::new(id, list_id, text.to_string(), position);
        task.created_at = Some(now);
        task.updated_at = Some(now);
        Ok(task)
    }

    /// Set a task's status. Entering `Archived` stamps `archived_at`;
    /// any other status clears it.
    pub async fn set_status(&self, id: u64, status: TaskStatus) -> DomainResult<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let archived_at = match status {
            TaskStatus::Archived => Some(now),
            _ => None,
        };

        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE tasks SET status = ?, archived_at = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), archived_at, now, id as i64],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Task {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Task> for TaskRepository {
    async fn create(&self, entity: &Task) -> DomainResult<Task> {
        let mut created = self.create_task(entity.list_id, &entity.text).await?;
        if entity.status != TaskStatus::Unchecked {
            self.set_status(created.id, entity.status).await?;
            created.status = entity.status;
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: u64) -> DomainResult<Option<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![id as i64], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tasks ORDER BY list_id, position, id",
                TASK_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }
        Ok(tasks)
    }

    async fn update(&self, entity: &Task) -> DomainResult<Task> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE tasks SET text = ?, list_id = ?, position = ?, status = ?, \
                 archived_at = ?, updated_at = ? WHERE id = ?",
                params![
                    entity.text,
                    entity.list_id as i64,
                    entity.order,
                    entity.status.as_str(),
                    entity.archived_at,
                    now,
                    entity.id as i64
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Task {} not found", entity.id)));
        }
        let mut updated = entity.clone();
        updated.updated_at = Some(now);
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM tasks WHERE id = ?", params![id as i64])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(())
    }
}

/// Convert a database row to Task. A status string outside the enum is a
/// conversion failure, never a silent default.
pub(super) fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_raw: String = row.get(4)?;
    let status = TaskStatus::parse(&status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Task {
        id: row.get::<_, i64>(0)? as u64,
        text: row.get(1)?,
        list_id: row.get::<_, i64>(2)? as u64,
        order: row.get(3)?,
        status,
        archived_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
