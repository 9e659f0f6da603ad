//! Repository Integration Tests
//!
//! Tests for ListRepository and TaskRepository with in-memory SQLite.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::domain::{DomainError, TaskStatus};
    use crate::repository::{
        init_db, ListPositioningOperations, ListRepository, Repository, TaskPositioningOperations,
        TaskRepository,
    };

    fn setup_test_db() -> (ListRepository, TaskRepository) {
        let conn = init_db(&PathBuf::from(":memory:")).expect("Failed to init test DB");
        (ListRepository::new(conn.clone()), TaskRepository::new(conn))
    }

    #[tokio::test]
    async fn test_create_list_appends_in_column() {
        let (lists, _) = setup_test_db();

        let a = lists.create_list(0, "Work").await.unwrap();
        let b = lists.create_list(0, "Home").await.unwrap();
        let c = lists.create_list(1, "Later").await.unwrap();

        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);
        // A fresh column starts at 0 again
        assert_eq!(c.order, 0);
    }

    #[tokio::test]
    async fn test_create_task_appends_and_trims_blank() {
        let (lists, tasks) = setup_test_db();
        let list = lists.create_list(0, "Work").await.unwrap();

        let t1 = tasks.create_task(list.id, "Write report").await.unwrap();
        let t2 = tasks.create_task(list.id, "   \t ").await.unwrap();

        assert_eq!(t1.order, 0);
        assert_eq!(t2.order, 1);
        // Whitespace-only became a blank task, not an error
        assert_eq!(t2.text, "");
    }

    #[tokio::test]
    async fn test_reorder_within_list_persists_dense_order() {
        let (lists, tasks) = setup_test_db();
        let work = lists.create_list(0, "Work").await.unwrap();
        let t1 = tasks.create_task(work.id, "T1").await.unwrap();
        let t2 = tasks.create_task(work.id, "T2").await.unwrap();

        tasks
            .reorder_within_list(work.id, &[t2.id, t1.id])
            .await
            .unwrap();

        let ordered = tasks.list_for(work.id).await.unwrap();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].id, t2.id);
        assert_eq!(ordered[0].order, 0);
        assert_eq!(ordered[1].id, t1.id);
        assert_eq!(ordered[1].order, 1);
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_id_without_writing() {
        let (lists, tasks) = setup_test_db();
        let work = lists.create_list(0, "Work").await.unwrap();
        let other = lists.create_list(0, "Other").await.unwrap();
        let t1 = tasks.create_task(work.id, "T1").await.unwrap();
        let t2 = tasks.create_task(work.id, "T2").await.unwrap();
        let foreign = tasks.create_task(other.id, "Elsewhere").await.unwrap();

        let err = tasks
            .reorder_within_list(work.id, &[foreign.id, t1.id, t2.id])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Nothing was written
        let ordered = tasks.list_for(work.id).await.unwrap();
        assert_eq!(ordered[0].id, t1.id);
        assert_eq!(ordered[1].id, t2.id);
        assert_eq!(ordered[0].order, 0);
        assert_eq!(ordered[1].order, 1);
    }

    #[tokio::test]
    async fn test_move_across_lists_preserves_total_count() {
        let (lists, tasks) = setup_test_db();
        let source = lists.create_list(0, "Source").await.unwrap();
        let target = lists.create_list(0, "Target").await.unwrap();
        let a = tasks.create_task(source.id, "A").await.unwrap();
        let b = tasks.create_task(source.id, "B").await.unwrap();
        let c = tasks.create_task(target.id, "C").await.unwrap();

        tasks
            .move_across_lists(a.id, source.id, target.id, &[a.id, c.id])
            .await
            .unwrap();

        let source_tasks = tasks.list_for(source.id).await.unwrap();
        let target_tasks = tasks.list_for(target.id).await.unwrap();
        assert_eq!(source_tasks.len(), 1);
        assert_eq!(target_tasks.len(), 2);
        // Both sides densely renumbered
        assert_eq!(source_tasks[0].id, b.id);
        assert_eq!(source_tasks[0].order, 0);
        assert_eq!(target_tasks[0].id, a.id);
        assert_eq!(target_tasks[0].order, 0);
        assert_eq!(target_tasks[1].order, 1);
    }

    #[tokio::test]
    async fn test_move_into_empty_list() {
        let (lists, tasks) = setup_test_db();
        let source = lists.create_list(0, "Source").await.unwrap();
        let empty = lists.create_list(0, "Empty").await.unwrap();
        let a = tasks.create_task(source.id, "A").await.unwrap();
        let b = tasks.create_task(source.id, "B").await.unwrap();

        tasks
            .move_across_lists(b.id, source.id, empty.id, &[b.id])
            .await
            .unwrap();

        let landed = tasks.list_for(empty.id).await.unwrap();
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].id, b.id);
        assert_eq!(landed[0].order, 0);
        let remaining = tasks.list_for(source.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, a.id);
        assert_eq!(remaining[0].order, 0);
    }

    #[tokio::test]
    async fn test_archive_round_trip() {
        let (lists, tasks) = setup_test_db();
        let work = lists.create_list(0, "Work").await.unwrap();
        let task = tasks.create_task(work.id, "Archive me").await.unwrap();

        tasks.set_status(task.id, TaskStatus::Archived).await.unwrap();
        let archived = tasks.find_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(archived.status, TaskStatus::Archived);
        assert!(archived.archived_at.is_some());
        // Archived tasks drop out of the ordered view
        assert!(tasks.list_for(work.id).await.unwrap().is_empty());

        tasks.set_status(task.id, TaskStatus::Checked).await.unwrap();
        let restored = tasks.find_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(restored.status, TaskStatus::Checked);
        assert!(restored.archived_at.is_none());
        assert_eq!(restored.text, "Archive me");
        assert_eq!(restored.id, task.id);
    }

    #[tokio::test]
    async fn test_set_status_unknown_task() {
        let (_, tasks) = setup_test_db();
        let err = tasks.set_status(999, TaskStatus::Checked).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reorder_lists_within_column() {
        let (lists, _) = setup_test_db();
        let a = lists.create_list(0, "A").await.unwrap();
        let b = lists.create_list(0, "B").await.unwrap();

        lists.reorder_within_column(0, &[b.id, a.id]).await.unwrap();

        let column = lists.list_in_column(0).await.unwrap();
        assert_eq!(column[0].id, b.id);
        assert_eq!(column[0].order, 0);
        assert_eq!(column[1].id, a.id);
        assert_eq!(column[1].order, 1);
    }

    #[tokio::test]
    async fn test_move_list_to_column_renumbers_both_sides() {
        let (lists, _) = setup_test_db();
        let a = lists.create_list(0, "A").await.unwrap();
        let b = lists.create_list(0, "B").await.unwrap();
        let c = lists.create_list(1, "C").await.unwrap();

        lists.move_to_column(a.id, 1, &[c.id, a.id]).await.unwrap();

        let col0 = lists.list_in_column(0).await.unwrap();
        let col1 = lists.list_in_column(1).await.unwrap();
        assert_eq!(col0.len(), 1);
        assert_eq!(col0[0].id, b.id);
        assert_eq!(col0[0].order, 0);
        assert_eq!(col1.iter().map(|l| l.id).collect::<Vec<_>>(), vec![c.id, a.id]);
        assert_eq!(col1[1].order, 1);
    }

    #[tokio::test]
    async fn test_delete_list_removes_its_tasks() {
        let (lists, tasks) = setup_test_db();
        let work = lists.create_list(0, "Work").await.unwrap();
        let task = tasks.create_task(work.id, "Orphan?").await.unwrap();

        Repository::delete(&lists, work.id).await.unwrap();

        assert!(lists.find_by_id(work.id).await.unwrap().is_none());
        assert!(tasks.find_by_id(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");

        let task_id = {
            let conn = init_db(&path).unwrap();
            let lists = ListRepository::new(conn.clone());
            let tasks = TaskRepository::new(conn);
            let work = lists.create_list(0, "Work").await.unwrap();
            tasks.create_task(work.id, "Persist me").await.unwrap().id
        };

        let conn = init_db(&path).unwrap();
        let tasks = TaskRepository::new(conn);
        let found = tasks.find_by_id(task_id).await.unwrap().unwrap();
        assert_eq!(found.text, "Persist me");
    }
}
