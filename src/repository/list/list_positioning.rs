//! List Positioning Operations
//!
//! Reordering within a column and moving across columns, mirroring the
//! task-side operations. Transactional, with the same membership check
//! before any write.

use std::collections::HashSet;

use async_trait::async_trait;
use rusqlite::{params, Transaction};

use crate::domain::{DomainError, DomainResult};

/// Trait for list positioning operations
#[async_trait]
pub trait ListPositioningOperations {
    /// Renumber a column's non-archived lists to match `ordered_ids`.
    /// Fails with `Conflict` (writing nothing) unless the ids are exactly
    /// that column's lists.
    async fn reorder_within_column(
        &self,
        column_index: i64,
        ordered_ids: &[u64],
    ) -> DomainResult<()>;

    /// Move a list to another column and renumber both columns.
    async fn move_to_column(
        &self,
        list_id: u64,
        to_column: i64,
        ordered_ids_for_target: &[u64],
    ) -> DomainResult<()>;
}

#[async_trait]
impl ListPositioningOperations for super::list_repo::ListRepository {
    async fn reorder_within_column(
        &self,
        column_index: i64,
        ordered_ids: &[u64],
    ) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let tx = guard
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let current = active_list_ids(&tx, column_index)?;
        verify_same_membership(&current, ordered_ids, column_index)?;
        renumber(&tx, ordered_ids)?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn move_to_column(
        &self,
        list_id: u64,
        to_column: i64,
        ordered_ids_for_target: &[u64],
    ) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let tx = guard
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let from_column: i64 = tx
            .query_row(
                "SELECT column_index FROM lists WHERE id = ? AND archived_at IS NULL",
                params![list_id as i64],
                |row| row.get(0),
            )
            .map_err(|_| DomainError::NotFound(format!("List {} not found", list_id)))?;

        let source = active_list_ids(&tx, from_column)?;
        let mut expected = active_list_ids(&tx, to_column)?;
        expected.push(list_id);
        verify_same_membership(&expected, ordered_ids_for_target, to_column)?;

        let now = chrono::Utc::now().timestamp_millis();
        tx.execute(
            "UPDATE lists SET column_index = ?, updated_at = ? WHERE id = ?",
            params![to_column, now, list_id as i64],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        renumber(&tx, ordered_ids_for_target)?;

        let remaining: Vec<u64> = source.into_iter().filter(|id| *id != list_id).collect();
        renumber(&tx, &remaining)?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }
}

/// Non-archived list ids of a column in current position order
fn active_list_ids(tx: &Transaction<'_>, column_index: i64) -> DomainResult<Vec<u64>> {
    let mut stmt = tx
        .prepare(
            "SELECT id FROM lists WHERE column_index = ? AND archived_at IS NULL \
             ORDER BY position, id",
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let rows = stmt
        .query_map(params![column_index], |row| row.get::<_, i64>(0))
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(|e| DomainError::Internal(e.to_string()))? as u64);
    }
    Ok(ids)
}

fn verify_same_membership(current: &[u64], proposed: &[u64], column: i64) -> DomainResult<()> {
    let current_set: HashSet<u64> = current.iter().copied().collect();
    let proposed_set: HashSet<u64> = proposed.iter().copied().collect();
    if current_set != proposed_set || proposed.len() != proposed_set.len() {
        return Err(DomainError::Conflict(format!(
            "Ordering does not match the lists of column {}",
            column
        )));
    }
    Ok(())
}

/// Write positions 0..n-1 following the given id order
fn renumber(tx: &Transaction<'_>, ordered_ids: &[u64]) -> DomainResult<()> {
    let now = chrono::Utc::now().timestamp_millis();
    for (position, id) in ordered_ids.iter().enumerate() {
        tx.execute(
            "UPDATE lists SET position = ?, updated_at = ? WHERE id = ?",
            params![position as i64, now, *id as i64],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    }
    Ok(())
}
