//! Task Positioning Operations
//!
//! Reordering within a list and moving across lists. Every multi-row
//! write runs in one transaction so a failed integrity check leaves the
//! stored order untouched, and positions stay a dense 0-based sequence.

use std::collections::HashSet;

use async_trait::async_trait;
use rusqlite::{params, Transaction};

use crate::domain::{DomainError, DomainResult};

/// Trait for task positioning operations
#[async_trait]
pub trait TaskPositioningOperations {
    /// Renumber a list's non-archived tasks to match `ordered_ids`.
    ///
    /// Every id must belong to the list, and the set must be exactly the
    /// list's non-archived tasks; otherwise the call fails with
    /// `Conflict` and nothing is written.
    async fn reorder_within_list(&self, list_id: u64, ordered_ids: &[u64]) -> DomainResult<()>;

    /// Move a task to another list and renumber both lists.
    ///
    /// `ordered_ids_for_target` is the target list's desired order and
    /// must contain exactly the target's current non-archived tasks plus
    /// the moved one. The source keeps its relative order and is
    /// renumbered densely.
    async fn move_across_lists(
        &self,
        task_id: u64,
        from_list: u64,
        to_list: u64,
        ordered_ids_for_target: &[u64],
    ) -> DomainResult<()>;
}

#[async_trait]
impl TaskPositioningOperations for super::task_repo::TaskRepository {
    async fn reorder_within_list(&self, list_id: u64, ordered_ids: &[u64]) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let tx = guard
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let current = active_task_ids(&tx, list_id)?;
        verify_same_membership(&current, ordered_ids, list_id)?;
        renumber(&tx, list_id, ordered_ids)?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn move_across_lists(
        &self,
        task_id: u64,
        from_list: u64,
        to_list: u64,
        ordered_ids_for_target: &[u64],
    ) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let tx = guard
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let source = active_task_ids(&tx, from_list)?;
        if !source.contains(&task_id) {
            return Err(DomainError::Conflict(format!(
                "Task {} does not belong to list {}",
                task_id, from_list
            )));
        }

        let mut expected = active_task_ids(&tx, to_list)?;
        expected.push(task_id);
        verify_same_membership(&expected, ordered_ids_for_target, to_list)?;

        let now = chrono::Utc::now().timestamp_millis();
        tx.execute(
            "UPDATE tasks SET list_id = ?, updated_at = ? WHERE id = ?",
            params![to_list as i64, now, task_id as i64],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        renumber(&tx, to_list, ordered_ids_for_target)?;

        // Source keeps its relative order minus the moved task
        let remaining: Vec<u64> = source.into_iter().filter(|id| *id != task_id).collect();
        renumber(&tx, from_list, &remaining)?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }
}

/// Non-archived task ids of a list in current position order
fn active_task_ids(tx: &Transaction<'_>, list_id: u64) -> DomainResult<Vec<u64>> {
    let mut stmt = tx
        .prepare(
            "SELECT id FROM tasks WHERE list_id = ? AND status != 'archived' \
             ORDER BY position, id",
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let rows = stmt
        .query_map(params![list_id as i64], |row| row.get::<_, i64>(0))
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(|e| DomainError::Internal(e.to_string()))? as u64);
    }
    Ok(ids)
}

/// Reject orderings that are not a permutation of the container's members
fn verify_same_membership(current: &[u64], proposed: &[u64], container: u64) -> DomainResult<()> {
    let current_set: HashSet<u64> = current.iter().copied().collect();
    let proposed_set: HashSet<u64> = proposed.iter().copied().collect();
    if current_set != proposed_set || proposed.len() != proposed_set.len() {
        return Err(DomainError::Conflict(format!(
            "Ordering does not match the tasks of list {}",
            container
        )));
    }
    Ok(())
}

/// Write positions 0..n-1 following the given id order
fn renumber(tx: &Transaction<'_>, list_id: u64, ordered_ids: &[u64]) -> DomainResult<()> {
    let now = chrono::Utc::now().timestamp_millis();
    for (position, id) in ordered_ids.iter().enumerate() {
        tx.execute(
            "UPDATE tasks SET position = ?, updated_at = ? WHERE id = ? AND list_id = ?",
            params![position as i64, now, *id as i64, list_id as i64],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    }
    Ok(())
}
