//! Keyboard Drag Engine
//!
//! The pick-up / move / drop state machine. Per item kind the machine is
//! Idle -> Armed -> Idle: Enter/Space on a focused item arms it, arrow
//! keys relocate it one step per keystroke (staging first, then the
//! durable write, then focus), Enter/Space or Escape drop it. Each
//! keystroke is one awaited persistence call; a lock drops overlapping
//! movement keys instead of queueing them, so rapid repeats may skip but
//! never corrupt order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error};

use crate::config::BoardConfig;
use crate::domain::{DomainError, DomainResult, List, Task};
use crate::focus::{FocusCoordinator, FocusTarget};
use crate::layout::{
    compute_move_target, find_neighbor, group_into_columns, position_of, MoveDirection, Traverse,
};
use crate::repository::{
    ListPositioningOperations, ListRepository, Repository, TaskPositioningOperations,
    TaskRepository,
};

use super::state::{ContainerId, DragStateManager};
use super::{DragKind, DragSession};

/// Key events the rendering layer routes to the engine before any other
/// handler (capture-phase equivalent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKey {
    /// Enter or Space
    Activate,
    Escape,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

enum EngineState {
    Idle {
        /// One-shot: the next Tab refocuses this instead of traversing
        pending_resume: Option<FocusTarget>,
    },
    Armed(DragSession),
}

/// Keyboard-driven drag coordination over both item kinds
pub struct KeyboardDragEngine {
    config: BoardConfig,
    lists: Arc<ListRepository>,
    tasks: Arc<TaskRepository>,
    task_drag: Arc<DragStateManager<Task>>,
    list_drag: Arc<DragStateManager<List>>,
    focus: Arc<FocusCoordinator>,
    state: Mutex<EngineState>,
    /// Serializes movement keystrokes; excess keys are dropped
    moving: AtomicBool,
}

impl KeyboardDragEngine {
    pub fn new(
        config: BoardConfig,
        lists: Arc<ListRepository>,
        tasks: Arc<TaskRepository>,
        task_drag: Arc<DragStateManager<Task>>,
        list_drag: Arc<DragStateManager<List>>,
        focus: Arc<FocusCoordinator>,
    ) -> Self {
        Self {
            config,
            lists,
            tasks,
            task_drag,
            list_drag,
            focus,
            state: Mutex::new(EngineState::Idle {
                pending_resume: None,
            }),
            moving: AtomicBool::new(false),
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(*self.state.lock().unwrap(), EngineState::Armed(_))
    }

    /// The session currently armed, if any
    pub fn session(&self) -> Option<DragSession> {
        match &*self.state.lock().unwrap() {
            EngineState::Armed(session) => Some(session.clone()),
            EngineState::Idle { .. } => None,
        }
    }

    /// Route one key event through the engine. Returns whether the engine
    /// consumed it (the rendering layer then suppresses its default
    /// handling for that keystroke).
    pub async fn handle_key(&self, key: DragKey, focused: Option<(DragKind, u64)>) -> bool {
        match key {
            DragKey::Activate => {
                if self.is_armed() {
                    self.on_drop_key();
                    true
                } else if let Some((kind, item_id)) = focused {
                    match self.on_pickup_key(kind, item_id).await {
                        Ok(armed) => armed,
                        Err(e) => {
                            error!("pick up failed for {:?} {}: {}", kind, item_id, e);
                            false
                        }
                    }
                } else {
                    false
                }
            }
            DragKey::Escape => self.on_cancel_key(),
            DragKey::Tab => self.on_tab_key().await,
            DragKey::Up => self.on_move_key(MoveDirection::Up).await,
            DragKey::Down => self.on_move_key(MoveDirection::Down).await,
            DragKey::Left => self.on_move_key(MoveDirection::Left).await,
            DragKey::Right => self.on_move_key(MoveDirection::Right).await,
        }
    }

    /// Idle -> Armed on a focused, idle item. Seeds staging with the
    /// item's container and marks it drag-active.
    pub async fn on_pickup_key(&self, kind: DragKind, item_id: u64) -> DomainResult<bool> {
        if self.is_armed() {
            return Ok(false);
        }

        let session = match kind {
            DragKind::Task => {
                let Some(task) = self.tasks.find_by_id(item_id).await? else {
                    return Ok(false);
                };
                let list_id = task.list_id;
                let items = self.tasks.list_for(list_id).await?;
                self.task_drag.start_drag(list_id, list_id);
                self.task_drag.update_during_drag(list_id, items);
                DragSession {
                    kind,
                    item_id,
                    source_container: list_id,
                    current_container: list_id,
                    origin: FocusTarget::Task(item_id),
                }
            }
            DragKind::List => {
                let all = self.lists.list_active().await?;
                let columns = group_into_columns(&all, self.config.column_count);
                let Some(pos) = position_of(item_id, &columns) else {
                    return Ok(false);
                };
                let container = pos.column as ContainerId;
                self.list_drag.start_drag(container, container);
                self.list_drag
                    .update_during_drag(container, columns[pos.column].clone());
                DragSession {
                    kind,
                    item_id,
                    source_container: container,
                    current_container: container,
                    origin: FocusTarget::List(item_id),
                }
            }
        };

        *self.state.lock().unwrap() = EngineState::Armed(session);
        Ok(true)
    }

    /// One movement keystroke. No-op when idle; dropped (not queued) when
    /// the previous move's persistence is still in flight. Persistence
    /// errors abort this single transition and leave staging as the
    /// visible state until the next natural resync.
    pub async fn on_move_key(&self, direction: MoveDirection) -> bool {
        let Some(session) = self.session() else {
            return false;
        };

        if self
            .moving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("movement key dropped: previous move still in flight");
            return true;
        }

        let result = match session.kind {
            DragKind::Task => self.move_task(&session, direction).await,
            DragKind::List => self.move_list(&session, direction).await,
        };
        self.moving.store(false, Ordering::SeqCst);

        match result {
            Ok(Some(new_container)) => {
                let mut state = self.state.lock().unwrap();
                if let EngineState::Armed(current) = &mut *state {
                    if current.item_id == session.item_id {
                        current.current_container = new_container;
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(
                    "keyboard move of {:?} {} aborted: {}",
                    session.kind, session.item_id, e
                );
            }
        }
        true
    }

    /// Armed -> Idle, scheduling the dropped element for Tab-resume
    pub fn on_drop_key(&self) -> bool {
        self.finish_drag(true, true)
    }

    /// Armed -> Idle without keeping the staged order as a success;
    /// the next source sync performs the rollback implicitly. Idempotent:
    /// Escape while idle is a no-op.
    pub fn on_cancel_key(&self) -> bool {
        self.finish_drag(false, true)
    }

    /// Tab while Armed is drop-then-blur (the drag ends, Tab proceeds
    /// normally). Tab while Idle consumes a pending one-shot resume and
    /// refocuses the last-dropped element instead of traversing.
    pub async fn on_tab_key(&self) -> bool {
        if self.finish_drag(true, false) {
            return false;
        }
        let target = match &mut *self.state.lock().unwrap() {
            EngineState::Idle { pending_resume } => pending_resume.take(),
            EngineState::Armed(_) => None,
        };
        match target {
            Some(target) => {
                self.focus.focus_with_retry(&target).await;
                true
            }
            None => false,
        }
    }

    /// Returns whether a drag was actually finished
    fn finish_drag(&self, success: bool, schedule_resume: bool) -> bool {
        let session = {
            let mut state = self.state.lock().unwrap();
            match &*state {
                EngineState::Armed(session) => {
                    let session = session.clone();
                    *state = EngineState::Idle {
                        pending_resume: schedule_resume.then(|| session.origin.clone()),
                    };
                    session
                }
                EngineState::Idle { .. } => return false,
            }
        };
        match session.kind {
            DragKind::Task => self.task_drag.complete_drag(
                session.source_container,
                session.current_container,
                success,
            ),
            DragKind::List => self.list_drag.complete_drag(
                session.source_container,
                session.current_container,
                success,
            ),
        }
        true
    }

    /// Move the armed task one step. Up/Down reorder within the list and
    /// cross to the previous/next list at the edges (entering at the edge
    /// nearest the exit direction); Left/Right relocate to the
    /// previous/next list appended at the end. Returns the new container
    /// when the task changed lists.
    async fn move_task(
        &self,
        session: &DragSession,
        direction: MoveDirection,
    ) -> DomainResult<Option<ContainerId>> {
        let list_id = session.current_container;
        let staged = self.task_drag.snapshot(list_id).items;
        let idx = staged
            .iter()
            .position(|t| t.id == session.item_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("Task {} not in staged list", session.item_id))
            })?;

        // Within-list reorder when there is room in that direction
        let within = match direction {
            MoveDirection::Up if idx > 0 => Some(idx - 1),
            MoveDirection::Down if idx + 1 < staged.len() => Some(idx + 1),
            _ => None,
        };
        if let Some(new_idx) = within {
            let mut items = staged;
            items.swap(idx, new_idx);
            let ids: Vec<u64> = items.iter().map(|t| t.id).collect();
            self.task_drag.update_during_drag(list_id, items);
            self.tasks.reorder_within_list(list_id, &ids).await?;
            self.focus
                .focus_with_retry(&FocusTarget::Task(session.item_id))
                .await;
            return Ok(None);
        }

        // Crossing: find the neighboring list in column-major read order
        let all = self.lists.list_active().await?;
        let columns = group_into_columns(&all, self.config.column_count);
        let traverse = match direction {
            MoveDirection::Down | MoveDirection::Right => Traverse::Next,
            MoveDirection::Up | MoveDirection::Left => Traverse::Prev,
        };
        let Some(dest_list) = find_neighbor(list_id, &columns, traverse) else {
            // Absolute start/end of the traversal order
            return Ok(None);
        };

        self.task_drag.start_drag(list_id, dest_list);

        let mut source_items = staged;
        let task = source_items.remove(idx);
        // Target staging may be cold; the durable store is current for
        // any container not part of this drag
        let mut target_items = self.tasks.list_for(dest_list).await?;
        match direction {
            // Entering from above: land at the top
            MoveDirection::Down => target_items.insert(0, task),
            // Entering from below, or sideways: land at the end
            _ => target_items.push(task),
        }
        let target_ids: Vec<u64> = target_items.iter().map(|t| t.id).collect();

        self.task_drag.update_during_drag(list_id, source_items);
        self.task_drag.update_during_drag(dest_list, target_items);
        self.tasks
            .move_across_lists(session.item_id, list_id, dest_list, &target_ids)
            .await?;
        self.focus
            .focus_with_retry(&FocusTarget::Task(session.item_id))
            .await;
        Ok(Some(dest_list))
    }

    /// Move the armed list one step in the column grid. Up/Down reorder
    /// within the column, crossing into the neighbor column's nearest
    /// edge when leaving it; Left/Right append at the end of the
    /// destination column.
    async fn move_list(
        &self,
        session: &DragSession,
        direction: MoveDirection,
    ) -> DomainResult<Option<ContainerId>> {
        let all = self.lists.list_active().await?;
        let mut columns = group_into_columns(&all, self.config.column_count);
        if self.fold_clamped_columns(&columns).await? {
            let all = self.lists.list_active().await?;
            columns = group_into_columns(&all, self.config.column_count);
        }
        let pos = position_of(session.item_id, &columns).ok_or_else(|| {
            DomainError::NotFound(format!("List {} not on the board", session.item_id))
        })?;

        match compute_move_target(pos, direction, &columns) {
            Some(target) if target.column == pos.column => {
                // Reorder within the column
                let mut bucket = columns[pos.column].clone();
                let list = bucket.remove(pos.row);
                let column_index = list.column_index;
                bucket.insert(target.row, list);
                let ids: Vec<u64> = bucket.iter().map(|l| l.id).collect();
                self.list_drag
                    .update_during_drag(pos.column as ContainerId, bucket);
                self.lists.reorder_within_column(column_index, &ids).await?;
                self.focus
                    .focus_with_retry(&FocusTarget::List(session.item_id))
                    .await;
                Ok(None)
            }
            Some(target) => {
                // Left/Right: append at the destination column's end
                self.cross_move_list(&columns, pos.column, target.column, false, session)
                    .await
            }
            None => match direction {
                // Leaving the column vertically: enter the neighbor
                // column at the edge nearest the exit direction
                MoveDirection::Up if pos.column > 0 => {
                    self.cross_move_list(&columns, pos.column, pos.column - 1, false, session)
                        .await
                }
                MoveDirection::Down if pos.column + 1 < columns.len() => {
                    self.cross_move_list(&columns, pos.column, pos.column + 1, true, session)
                        .await
                }
                // Absolute start/end of the traversal order
                _ => Ok(None),
            },
        }
    }

    /// Rewrite stored column indexes that the layout clamped (negative,
    /// or at/past the column count) to the visual column they display
    /// in, preserving the visual order. The stored columns then match
    /// what the positioning membership checks see, so the following
    /// reorder or move persists instead of being rejected.
    async fn fold_clamped_columns(&self, columns: &[Vec<List>]) -> DomainResult<bool> {
        let mut changed = false;
        for (visual, bucket) in columns.iter().enumerate() {
            let visual_index = visual as i64;
            let mut settled: HashSet<u64> = bucket
                .iter()
                .filter(|l| l.column_index == visual_index)
                .map(|l| l.id)
                .collect();
            for list in bucket {
                if list.column_index == visual_index {
                    continue;
                }
                settled.insert(list.id);
                let ids: Vec<u64> = bucket
                    .iter()
                    .filter(|l| settled.contains(&l.id))
                    .map(|l| l.id)
                    .collect();
                self.lists.move_to_column(list.id, visual_index, &ids).await?;
                changed = true;
            }
        }
        Ok(changed)
    }

    async fn cross_move_list(
        &self,
        columns: &[Vec<List>],
        from: usize,
        to: usize,
        insert_at_top: bool,
        session: &DragSession,
    ) -> DomainResult<Option<ContainerId>> {
        self.list_drag
            .start_drag(from as ContainerId, to as ContainerId);

        let mut source = columns[from].clone();
        let idx = source
            .iter()
            .position(|l| l.id == session.item_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("List {} not in staged column", session.item_id))
            })?;
        let list = source.remove(idx);
        let mut target = columns[to].clone();
        if insert_at_top {
            target.insert(0, list);
        } else {
            target.push(list);
        }
        let target_ids: Vec<u64> = target.iter().map(|l| l.id).collect();

        self.list_drag
            .update_during_drag(from as ContainerId, source);
        self.list_drag.update_during_drag(to as ContainerId, target);
        self.lists
            .move_to_column(session.item_id, to as i64, &target_ids)
            .await?;
        self.focus
            .focus_with_retry(&FocusTarget::List(session.item_id))
            .await;
        Ok(Some(to as ContainerId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusHost;
    use crate::repository::init_db;
    use std::path::PathBuf;

    /// Rendering layer that always has the element ready
    struct NullHost;

    impl FocusHost for NullHost {
        fn try_focus(&self, _target: &FocusTarget) -> bool {
            true
        }
    }

    struct Fixture {
        lists: Arc<ListRepository>,
        tasks: Arc<TaskRepository>,
        task_drag: Arc<DragStateManager<Task>>,
        list_drag: Arc<DragStateManager<List>>,
        engine: KeyboardDragEngine,
    }

    fn setup() -> Fixture {
        let conn = init_db(&PathBuf::from(":memory:")).expect("Failed to init test DB");
        let config = BoardConfig::default();
        let lists = Arc::new(ListRepository::new(conn.clone()));
        let tasks = Arc::new(TaskRepository::new(conn));
        let task_drag = Arc::new(DragStateManager::new());
        let list_drag = Arc::new(DragStateManager::new());
        let focus = Arc::new(FocusCoordinator::new(Arc::new(NullHost), &config));
        let engine = KeyboardDragEngine::new(
            config,
            lists.clone(),
            tasks.clone(),
            task_drag.clone(),
            list_drag.clone(),
            focus,
        );
        Fixture {
            lists,
            tasks,
            task_drag,
            list_drag,
            engine,
        }
    }

    #[tokio::test]
    async fn test_pickup_arms_and_seeds_staging() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();
        f.tasks.create_task(work.id, "T2").await.unwrap();

        let armed = f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        assert!(armed);
        assert!(f.engine.is_armed());
        assert!(f.task_drag.is_drag_active_for(work.id));
        assert_eq!(f.task_drag.snapshot(work.id).items.len(), 2);
    }

    #[tokio::test]
    async fn test_pickup_unknown_item_stays_idle() {
        let f = setup();
        let armed = f.engine.on_pickup_key(DragKind::Task, 404).await.unwrap();
        assert!(!armed);
        assert!(!f.engine.is_armed());
    }

    #[tokio::test]
    async fn test_move_down_reorders_and_persists() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();
        let t2 = f.tasks.create_task(work.id, "T2").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        assert!(f.engine.on_move_key(MoveDirection::Down).await);

        let staged: Vec<u64> = f
            .task_drag
            .snapshot(work.id)
            .items
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(staged, vec![t2.id, t1.id]);

        let persisted = f.tasks.list_for(work.id).await.unwrap();
        assert_eq!(persisted[0].id, t2.id);
        assert_eq!(persisted[0].order, 0);
        assert_eq!(persisted[1].id, t1.id);
        assert_eq!(persisted[1].order, 1);
    }

    #[tokio::test]
    async fn test_move_down_past_edge_enters_next_list_at_top() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let home = f.lists.create_list(0, "Home").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();
        let existing = f.tasks.create_task(home.id, "H1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Down).await;

        let home_tasks = f.tasks.list_for(home.id).await.unwrap();
        assert_eq!(home_tasks.len(), 2);
        assert_eq!(home_tasks[0].id, t1.id);
        assert_eq!(home_tasks[0].order, 0);
        assert_eq!(home_tasks[1].id, existing.id);
        assert!(f.tasks.list_for(work.id).await.unwrap().is_empty());
        // Session follows the task into its new container
        assert_eq!(f.engine.session().unwrap().current_container, home.id);
    }

    #[tokio::test]
    async fn test_move_up_past_edge_enters_previous_list_at_end() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let home = f.lists.create_list(0, "Home").await.unwrap();
        let existing = f.tasks.create_task(work.id, "W1").await.unwrap();
        let t1 = f.tasks.create_task(home.id, "H1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Up).await;

        let work_tasks = f.tasks.list_for(work.id).await.unwrap();
        assert_eq!(work_tasks.len(), 2);
        assert_eq!(work_tasks[0].id, existing.id);
        assert_eq!(work_tasks[1].id, t1.id);
        assert_eq!(work_tasks[1].order, 1);
    }

    #[tokio::test]
    async fn test_move_down_at_absolute_end_is_noop() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "Only").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Down).await;

        let tasks = f.tasks.list_for(work.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].order, 0);
        assert_eq!(f.engine.session().unwrap().current_container, work.id);
    }

    #[tokio::test]
    async fn test_drop_completes_and_allows_resync() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        assert!(f.engine.on_drop_key());
        assert!(!f.engine.is_armed());
        assert!(!f.task_drag.is_drag_active());

        // The gate is open again for the reactive source
        let fresh = f.tasks.list_for(work.id).await.unwrap();
        assert!(f.task_drag.initialize_from_source(work.id, fresh));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        assert!(f.engine.on_cancel_key());
        assert!(!f.engine.is_armed());
        // Second Escape while idle mutates nothing
        assert!(!f.engine.on_cancel_key());
    }

    #[tokio::test]
    async fn test_tab_resume_is_one_shot() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        f.engine.on_drop_key();

        // First Tab refocuses the dropped element instead of traversing
        assert!(f.engine.on_tab_key().await);
        // Second Tab traverses normally
        assert!(!f.engine.on_tab_key().await);
    }

    #[tokio::test]
    async fn test_tab_while_armed_drops_without_resume() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        // Drop-then-blur: not consumed, Tab proceeds normally
        assert!(!f.engine.on_tab_key().await);
        assert!(!f.engine.is_armed());
        // And no resume was scheduled
        assert!(!f.engine.on_tab_key().await);
    }

    #[tokio::test]
    async fn test_move_keys_ignored_while_idle() {
        let f = setup();
        assert!(!f.engine.on_move_key(MoveDirection::Down).await);
    }

    #[tokio::test]
    async fn test_list_move_right_appends_to_destination_column() {
        let f = setup();
        let a = f.lists.create_list(0, "A").await.unwrap();
        let b = f.lists.create_list(1, "B").await.unwrap();

        f.engine.on_pickup_key(DragKind::List, a.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Right).await;

        let col1 = f.lists.list_in_column(1).await.unwrap();
        assert_eq!(col1.iter().map(|l| l.id).collect::<Vec<_>>(), vec![b.id, a.id]);
        assert_eq!(col1[1].order, 1);
        assert!(f.lists.list_in_column(0).await.unwrap().is_empty());
        assert_eq!(f.engine.session().unwrap().current_container, 1);
        assert!(f.list_drag.is_drag_active_for(1));
    }

    #[tokio::test]
    async fn test_list_move_down_within_column_then_into_next() {
        let f = setup();
        let a = f.lists.create_list(0, "A").await.unwrap();
        let b = f.lists.create_list(0, "B").await.unwrap();
        let c = f.lists.create_list(1, "C").await.unwrap();

        f.engine.on_pickup_key(DragKind::List, a.id).await.unwrap();
        // Within the column: A swaps below B
        f.engine.on_move_key(MoveDirection::Down).await;
        let col0 = f.lists.list_in_column(0).await.unwrap();
        assert_eq!(col0.iter().map(|l| l.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        // Past the edge: A enters column 1 at the top
        f.engine.on_move_key(MoveDirection::Down).await;
        let col1 = f.lists.list_in_column(1).await.unwrap();
        assert_eq!(col1.iter().map(|l| l.id).collect::<Vec<_>>(), vec![a.id, c.id]);
        assert_eq!(col1[0].order, 0);
    }

    #[tokio::test]
    async fn test_list_move_left_at_first_column_is_noop() {
        let f = setup();
        let a = f.lists.create_list(0, "A").await.unwrap();

        f.engine.on_pickup_key(DragKind::List, a.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Left).await;

        let col0 = f.lists.list_in_column(0).await.unwrap();
        assert_eq!(col0.len(), 1);
        assert_eq!(col0[0].id, a.id);
    }

    #[tokio::test]
    async fn test_list_move_in_clamped_column_persists() {
        let f = setup();
        let b = f.lists.create_list(4, "B").await.unwrap();
        // Stored column beyond the board displays in the last visual column
        let c = f.lists.create_list(9, "C").await.unwrap();

        f.engine.on_pickup_key(DragKind::List, b.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Down).await;

        let col = f.lists.list_in_column(4).await.unwrap();
        assert_eq!(col.iter().map(|l| l.id).collect::<Vec<_>>(), vec![c.id, b.id]);
        assert_eq!(col[0].order, 0);
        assert_eq!(col[1].order, 1);
        // The clamped list's stored column now matches where it displays
        assert_eq!(col[0].column_index, 4);
    }

    #[tokio::test]
    async fn test_source_sync_gated_during_armed_drag() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();
        let t2 = f.tasks.create_task(work.id, "T2").await.unwrap();

        f.engine.on_pickup_key(DragKind::Task, t1.id).await.unwrap();
        f.engine.on_move_key(MoveDirection::Down).await;
        let before = f.task_drag.snapshot(work.id);

        // A stale reactive read must not clobber the in-flight order
        let stale = vec![
            Task::new(t1.id, work.id, "T1".into(), 0),
            Task::new(t2.id, work.id, "T2".into(), 1),
        ];
        assert!(!f.task_drag.initialize_from_source(work.id, stale));
        let after = f.task_drag.snapshot(work.id);
        assert_eq!(after.version, before.version);
        assert_eq!(after.items[0].id, t2.id);
    }

    #[tokio::test]
    async fn test_handle_key_activate_toggles_pickup_and_drop() {
        let f = setup();
        let work = f.lists.create_list(0, "Work").await.unwrap();
        let t1 = f.tasks.create_task(work.id, "T1").await.unwrap();

        let focused = Some((DragKind::Task, t1.id));
        assert!(f.engine.handle_key(DragKey::Activate, focused).await);
        assert!(f.engine.is_armed());
        assert!(f.engine.handle_key(DragKey::Activate, focused).await);
        assert!(!f.engine.is_armed());
    }
}
