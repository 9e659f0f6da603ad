//! Board Facade
//!
//! Wires the repositories, both drag state managers, the pointer
//! adapter, the keyboard engine and the focus coordinator into one
//! shared application state, and carries the non-drag flows (create,
//! archive, restore, delete) that also need renumbering and follow-up
//! focus.

use std::sync::Arc;

use crate::config::BoardConfig;
use crate::domain::{DomainError, DomainResult, List, Task, TaskStatus};
use crate::drag::keyboard::KeyboardDragEngine;
use crate::drag::pointer::PointerDragAdapter;
use crate::drag::state::DragStateManager;
use crate::focus::{FocusCoordinator, FocusHost, FocusTarget};
use crate::layout::group_into_columns;
use crate::repository::{
    DbConnection, ListPositioningOperations, ListRepository, Repository,
    TaskPositioningOperations, TaskRepository,
};

/// Application state shared by the rendering layer
pub struct Board {
    config: BoardConfig,
    pub lists: Arc<ListRepository>,
    pub tasks: Arc<TaskRepository>,
    pub task_drag: Arc<DragStateManager<Task>>,
    pub list_drag: Arc<DragStateManager<List>>,
    pub focus: Arc<FocusCoordinator>,
    pub keyboard: KeyboardDragEngine,
    pub task_zones: PointerDragAdapter<Task>,
    pub list_zones: PointerDragAdapter<List>,
}

impl Board {
    pub fn new(conn: DbConnection, host: Arc<dyn FocusHost>, config: BoardConfig) -> Self {
        let lists = Arc::new(ListRepository::new(conn.clone()));
        let tasks = Arc::new(TaskRepository::new(conn));
        let task_drag = Arc::new(DragStateManager::new());
        let list_drag = Arc::new(DragStateManager::new());
        let focus = Arc::new(FocusCoordinator::new(host, &config));
        let keyboard = KeyboardDragEngine::new(
            config,
            lists.clone(),
            tasks.clone(),
            task_drag.clone(),
            list_drag.clone(),
            focus.clone(),
        );
        Self {
            config,
            lists,
            tasks,
            task_drag: task_drag.clone(),
            list_drag: list_drag.clone(),
            focus,
            keyboard,
            task_zones: PointerDragAdapter::new(task_drag),
            list_zones: PointerDragAdapter::new(list_drag),
        }
    }

    /// Pull one list's tasks from the durable store into staging.
    /// Gated away while that list is part of an active drag.
    pub async fn refresh_list(&self, list_id: u64) -> DomainResult<bool> {
        let items = self.tasks.list_for(list_id).await?;
        Ok(self.task_drag.initialize_from_source(list_id, items))
    }

    /// Pull the column layout and every list's tasks from the durable
    /// store. Drag-active containers keep their staged view.
    pub async fn refresh_board(&self) -> DomainResult<()> {
        let all = self.lists.list_active().await?;
        let columns = group_into_columns(&all, self.config.column_count);
        for (index, bucket) in columns.into_iter().enumerate() {
            self.list_drag.initialize_from_source(index as u64, bucket);
        }
        for list in &all {
            self.refresh_list(list.id).await?;
        }
        Ok(())
    }

    /// Create a task at the end of a list and focus its card
    pub async fn create_task(&self, list_id: u64, text: &str) -> DomainResult<Task> {
        let task = self.tasks.create_task(list_id, text).await?;
        self.refresh_list(list_id).await?;
        self.focus
            .focus_with_retry(&FocusTarget::Task(task.id))
            .await;
        Ok(task)
    }

    /// Create a list at the bottom of a column and focus its new-task
    /// input
    pub async fn create_list(&self, column_index: i64, name: &str) -> DomainResult<List> {
        let list = self.lists.create_list(column_index, name).await?;
        self.refresh_board().await?;
        self.focus
            .focus_with_retry(&FocusTarget::TaskInput(list.id))
            .await;
        Ok(list)
    }

    pub async fn set_task_status(&self, id: u64, status: TaskStatus) -> DomainResult<()> {
        if status == TaskStatus::Archived {
            return self.archive_task(id).await;
        }
        self.tasks.set_status(id, status).await?;
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        // Restoring from the archive re-enters the ordered set at the
        // end; the stored position is stale so the restored id is
        // appended explicitly rather than trusted from the read order
        let mut ids: Vec<u64> = self
            .tasks
            .list_for(task.list_id)
            .await?
            .iter()
            .map(|t| t.id)
            .filter(|tid| *tid != id)
            .collect();
        ids.push(id);
        self.tasks.reorder_within_list(task.list_id, &ids).await?;
        self.refresh_list(task.list_id).await.map(|_| ())
    }

    /// Archive a task, keep the list's order dense, and move focus to a
    /// surviving neighbor
    pub async fn archive_task(&self, id: u64) -> DomainResult<()> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        let neighbor = self.neighbor_focus(task.list_id, id).await?;

        self.tasks.set_status(id, TaskStatus::Archived).await?;
        let remaining: Vec<u64> = self
            .tasks
            .list_for(task.list_id)
            .await?
            .iter()
            .map(|t| t.id)
            .collect();
        self.tasks
            .reorder_within_list(task.list_id, &remaining)
            .await?;
        self.refresh_list(task.list_id).await?;
        self.focus.focus_with_retry(&neighbor).await;
        Ok(())
    }

    /// Permanently delete a task (explicit confirmation flow lives in
    /// the UI layer)
    pub async fn delete_task(&self, id: u64) -> DomainResult<()> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        let neighbor = self.neighbor_focus(task.list_id, id).await?;

        Repository::delete(self.tasks.as_ref(), id).await?;
        let remaining: Vec<u64> = self
            .tasks
            .list_for(task.list_id)
            .await?
            .iter()
            .map(|t| t.id)
            .collect();
        self.tasks
            .reorder_within_list(task.list_id, &remaining)
            .await?;
        self.refresh_list(task.list_id).await?;
        self.focus.focus_with_retry(&neighbor).await;
        Ok(())
    }

    /// Archive a list and keep its column's order dense
    pub async fn archive_list(&self, id: u64) -> DomainResult<()> {
        let list = self
            .lists
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("List {} not found", id)))?;
        self.lists.set_archived(id, true).await?;
        let remaining: Vec<u64> = self
            .lists
            .list_in_column(list.column_index)
            .await?
            .iter()
            .map(|l| l.id)
            .collect();
        self.lists
            .reorder_within_column(list.column_index, &remaining)
            .await?;
        self.refresh_board().await
    }

    /// Persist a pointer drop. `ordered_ids_for_dest` is the destination
    /// zone's reconstructed order (only the destination reports one, see
    /// the pointer adapter), so exactly one write happens per drop.
    pub async fn apply_task_drop(
        &self,
        origin_list: u64,
        dest_list: u64,
        ordered_ids_for_dest: &[u64],
    ) -> DomainResult<()> {
        if origin_list == dest_list {
            self.tasks
                .reorder_within_list(dest_list, ordered_ids_for_dest)
                .await?;
        } else {
            let moved = self.moved_task_id(origin_list, ordered_ids_for_dest).await?;
            self.tasks
                .move_across_lists(moved, origin_list, dest_list, ordered_ids_for_dest)
                .await?;
            self.refresh_list(origin_list).await?;
        }
        self.refresh_list(dest_list).await?;
        Ok(())
    }

    /// The id in the destination order that still belongs to the origin
    async fn moved_task_id(&self, origin_list: u64, dest_order: &[u64]) -> DomainResult<u64> {
        for id in dest_order {
            if let Some(task) = self.tasks.find_by_id(*id).await? {
                if task.list_id == origin_list {
                    return Ok(*id);
                }
            }
        }
        Err(DomainError::Conflict(format!(
            "No task in the drop order belongs to list {}",
            origin_list
        )))
    }

    /// Where focus should land once `removed` leaves `list_id`: the next
    /// task down, else the one above, else the list card itself
    async fn neighbor_focus(&self, list_id: u64, removed: u64) -> DomainResult<FocusTarget> {
        let tasks = self.tasks.list_for(list_id).await?;
        let idx = tasks.iter().position(|t| t.id == removed);
        let target = match idx {
            Some(idx) if idx + 1 < tasks.len() => FocusTarget::Task(tasks[idx + 1].id),
            Some(idx) if idx > 0 => FocusTarget::Task(tasks[idx - 1].id),
            _ => FocusTarget::List(list_id),
        };
        Ok(target)
    }
}
