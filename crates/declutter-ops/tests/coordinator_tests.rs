use std::sync::{Arc, Mutex};
use std::time::Duration;

use declutter_core::fixtures::{date, demo_groups, demo_store_entries};
use declutter_core::{
    BatchError, CoordinatorConfig, DuplicateFile, DuplicateGroup, ExecutorError, RetentionStrategy,
};
use declutter_ops::{
    ActionRequest, ActionResponse, AlwaysConfirm, BatchCoordinator, BoxFuture, ConfirmRequest,
    FileAction, FileActionExecutor, MemoryStore, NeverConfirm, PathOutcome, PendingAction,
    UndoExecutor,
};

/// Executor that replays a scripted response and records every call.
#[derive(Default)]
struct ScriptedExecutor {
    response: Mutex<Option<Result<ActionResponse, ExecutorError>>>,
    requests: Mutex<Vec<ActionRequest>>,
    undo_result: Mutex<Option<ExecutorError>>,
    undone: Mutex<Vec<PendingAction>>,
}

impl ScriptedExecutor {
    fn replying(outcomes: Vec<PathOutcome>) -> Arc<Self> {
        let executor = Self::default();
        *executor.response.lock().unwrap() = Some(Ok(ActionResponse {
            outcomes,
            archive_name: None,
        }));
        Arc::new(executor)
    }

    fn failing(err: ExecutorError) -> Arc<Self> {
        let executor = Self::default();
        *executor.response.lock().unwrap() = Some(Err(err));
        Arc::new(executor)
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl FileActionExecutor for ScriptedExecutor {
    fn execute<'a>(
        &'a self,
        request: &'a ActionRequest,
    ) -> BoxFuture<'a, Result<ActionResponse, ExecutorError>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            match self.response.lock().unwrap().clone() {
                Some(response) => response,
                // Apply everything by default
                None => Ok(ActionResponse {
                    outcomes: request.paths.iter().map(PathOutcome::applied).collect(),
                    archive_name: None,
                }),
            }
        })
    }
}

impl UndoExecutor for ScriptedExecutor {
    fn undo<'a>(&'a self, action: &'a PendingAction) -> BoxFuture<'a, Result<(), ExecutorError>> {
        Box::pin(async move {
            if let Some(err) = self.undo_result.lock().unwrap().clone() {
                return Err(err);
            }
            self.undone.lock().unwrap().push(action.clone());
            Ok(())
        })
    }
}

fn coordinator_with(
    executor: Arc<ScriptedExecutor>,
    groups: Vec<DuplicateGroup>,
) -> BatchCoordinator {
    BatchCoordinator::new(groups, executor.clone(), executor, Arc::new(AlwaysConfirm))
}

fn pair_group() -> DuplicateGroup {
    DuplicateGroup::new(
        "1",
        vec![
            DuplicateFile::new("A", "a.pdf", "/Documents/a.pdf", 100, date(2023, 3, 15)),
            DuplicateFile::new("B", "b.pdf", "/Downloads/b.pdf", 100, date(2023, 3, 14)),
        ],
    )
}

fn demo_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_files(demo_store_entries()))
}

#[tokio::test]
async fn test_oldest_delete_drops_resolved_group() {
    let executor = ScriptedExecutor::replying(vec![PathOutcome::applied("/Documents/a.pdf")]);
    let coordinator = coordinator_with(executor.clone(), vec![pair_group()]);

    let report = coordinator
        .execute_batch(RetentionStrategy::Oldest, FileAction::Delete)
        .await
        .unwrap();

    assert_eq!(report.succeeded, vec!["/Documents/a.pdf".to_string()]);
    assert!(!report.is_partial_failure());
    assert_eq!(report.groups_removed, vec!["1".to_string()]);
    assert!(coordinator.groups().is_empty());

    let pending = coordinator.pending_action().unwrap();
    assert_eq!(pending.action, FileAction::Delete);
    assert_eq!(pending.file_paths, vec!["/Documents/a.pdf".to_string()]);
    assert_eq!(pending.destination(), None);
}

#[tokio::test]
async fn test_manual_sends_unselected_files_in_order() {
    let group = DuplicateGroup::new(
        "3",
        vec![
            DuplicateFile::new("file1", "f1", "/x/f1", 5, date(2023, 1, 1)),
            DuplicateFile::new("file2", "f2", "/x/f2", 5, date(2023, 1, 2)),
            DuplicateFile::new("file3", "f3", "/x/f3", 5, date(2023, 1, 3)),
        ],
    );
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), vec![group]);
    coordinator.select("file2");

    let report = coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap();

    let requests = executor.requests.lock().unwrap();
    assert_eq!(requests[0].paths, vec!["/x/f1".to_string(), "/x/f3".to_string()]);
    assert_eq!(report.requested, 2);
    assert!(coordinator.groups().is_empty());
    assert!(coordinator.selection().is_empty());
}

#[tokio::test]
async fn test_partial_failure_commits_successes() {
    let executor = ScriptedExecutor::replying(vec![
        PathOutcome::applied("/Downloads/document_copy.pdf"),
        PathOutcome::not_found("/Backups/image_backup.jpg"),
        PathOutcome::applied("/Downloads/image_copy.jpg"),
    ]);
    let coordinator = coordinator_with(executor, demo_groups());

    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    assert!(report.is_partial_failure());
    assert_eq!(
        report.failure_messages(),
        vec!["notFound: /Backups/image_backup.jpg".to_string()]
    );

    // Group 1 is resolved; group 2 keeps image.jpg and the file that failed.
    let groups = coordinator.groups();
    assert_eq!(groups.len(), 1);
    let paths: Vec<&str> = groups[0].files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["/Pictures/image.jpg", "/Backups/image_backup.jpg"]);

    let pending = coordinator.pending_action().unwrap();
    assert_eq!(
        pending.file_paths,
        vec![
            "/Downloads/document_copy.pdf".to_string(),
            "/Downloads/image_copy.jpg".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_one_applied_one_not_found() {
    let group = DuplicateGroup::new(
        "g",
        vec![
            DuplicateFile::new("k", "k", "/keep", 1, date(2023, 1, 3)),
            DuplicateFile::new("x", "x", "/gone", 1, date(2023, 1, 2)),
            DuplicateFile::new("y", "y", "/ok", 1, date(2023, 1, 1)),
        ],
    );
    let executor = ScriptedExecutor::replying(vec![
        PathOutcome::not_found("/gone"),
        PathOutcome::applied("/ok"),
    ]);
    let coordinator = coordinator_with(executor, vec![group]);

    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    assert_eq!(report.failure_messages(), vec!["notFound: /gone".to_string()]);
    assert_eq!(coordinator.groups()[0].count(), 2);
    assert_eq!(
        coordinator.pending_action().unwrap().file_paths,
        vec!["/ok".to_string()]
    );
}

#[tokio::test]
async fn test_all_failures_leave_pending_action_untouched() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());
    for id in ["1a", "2a", "2b"] {
        coordinator.select(id);
    }
    coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap();
    let first = coordinator.pending_action().unwrap();
    let groups = coordinator.groups();
    assert_eq!(groups.len(), 1);

    *executor.response.lock().unwrap() = Some(Ok(ActionResponse {
        outcomes: vec![PathOutcome::error("/Backups/image_backup.jpg", "locked")],
        archive_name: None,
    }));
    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    assert!(!report.has_successes());
    assert_eq!(
        report.failure_messages(),
        vec!["error: /Backups/image_backup.jpg: locked".to_string()]
    );
    assert_eq!(coordinator.pending_action(), Some(first));
    assert_eq!(coordinator.groups(), groups);
}

#[tokio::test]
async fn test_missing_outcome_counts_as_failure() {
    let executor = ScriptedExecutor::replying(vec![PathOutcome::applied(
        "/Downloads/document_copy.pdf",
    )]);
    let coordinator = coordinator_with(executor, demo_groups());

    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(
        report.failures[0].to_string(),
        "error: /Backups/image_backup.jpg: no outcome reported"
    );
}

#[tokio::test]
async fn test_manual_without_selection_fails() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());

    let err = coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::NoSelection);
    assert_eq!(coordinator.groups(), demo_groups());
    assert!(coordinator.pending_action().is_none());
    assert_eq!(executor.request_count(), 0);
}

#[tokio::test]
async fn test_nothing_to_process_clears_selection() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());
    for id in ["1a", "1b", "2a", "2b", "2c"] {
        coordinator.select(id);
    }

    let err = coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::NothingToProcess);
    assert!(coordinator.selection().is_empty());
    assert_eq!(executor.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_move_is_rejected() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());

    let err = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::move_to(""))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::InvalidAction { .. }));
    assert_eq!(executor.request_count(), 0);
    assert_eq!(coordinator.groups(), demo_groups());
}

#[tokio::test]
async fn test_declined_confirmation_has_no_side_effects() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = BatchCoordinator::new(
        demo_groups(),
        executor.clone(),
        executor.clone(),
        Arc::new(NeverConfirm),
    );
    coordinator.select("1a");

    let err = coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::Cancelled);
    assert_eq!(executor.request_count(), 0);
    assert_eq!(coordinator.groups(), demo_groups());
    assert!(coordinator.selection().is_empty());
}

#[tokio::test]
async fn test_confirmation_sees_surplus() {
    let seen = Arc::new(Mutex::new(None));
    let seen_in_gate = seen.clone();
    let confirm = move |request: &ConfirmRequest| {
        *seen_in_gate.lock().unwrap() = Some(request.to_string());
        true
    };
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator =
        BatchCoordinator::new(demo_groups(), executor.clone(), executor, Arc::new(confirm));

    coordinator
        .execute_batch(RetentionStrategy::Oldest, FileAction::move_to("/Sorted"))
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().as_deref(),
        Some("Are you sure you want to move 3 file(s)?")
    );
}

#[tokio::test]
async fn test_transport_error_aborts_without_mutation() {
    let executor = ScriptedExecutor::failing(ExecutorError::transport("connection refused"));
    let coordinator = coordinator_with(executor, demo_groups());
    coordinator.select("1a");

    let err = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::Transport { .. }));
    assert_eq!(coordinator.groups(), demo_groups());
    assert!(coordinator.pending_action().is_none());
    assert!(coordinator.selection().is_empty());
}

#[tokio::test]
async fn test_archive_creation_error() {
    let executor = ScriptedExecutor::failing(ExecutorError::archive_creation("zip failed"));
    let coordinator = coordinator_with(executor, demo_groups());

    let err = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::archive("dupes.zip"))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::ArchiveCreation { .. }));
    assert_eq!(coordinator.groups(), demo_groups());
}

#[tokio::test]
async fn test_undo_succeeds_exactly_once() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());
    coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    let undone = coordinator.undo().await.unwrap();
    assert_eq!(undone.file_paths.len(), 3);
    assert_eq!(executor.undone.lock().unwrap().len(), 1);

    assert_eq!(coordinator.undo().await.unwrap_err(), BatchError::NoPendingAction);
    assert!(coordinator.pending_action().is_none());
}

#[tokio::test]
async fn test_undo_without_history() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor, demo_groups());
    assert_eq!(coordinator.undo().await.unwrap_err(), BatchError::NoPendingAction);
}

#[tokio::test]
async fn test_pending_action_is_replaced_not_stacked() {
    let store = demo_store();
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm));

    // First batch resolves group 1 only.
    coordinator.select("1a");
    coordinator.select("2a");
    coordinator.select("2b");
    coordinator
        .execute_batch(RetentionStrategy::Manual, FileAction::Delete)
        .await
        .unwrap();
    assert_eq!(coordinator.groups().len(), 1);

    // Second batch acts on group 2.
    coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::move_to("/Sorted"))
        .await
        .unwrap();
    let pending = coordinator.pending_action().unwrap();
    assert_eq!(pending.action, FileAction::move_to("/Sorted"));
    assert_eq!(pending.file_paths, vec!["/Backups/image_backup.jpg".to_string()]);

    coordinator.undo().await.unwrap();
    assert_eq!(coordinator.undo().await.unwrap_err(), BatchError::NoPendingAction);
    assert!(!store.contains("/Downloads/document_copy.pdf"));
}

#[tokio::test]
async fn test_undo_restores_groups_and_store() {
    let store = demo_store();
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm));

    let report = coordinator
        .execute_batch(RetentionStrategy::Oldest, FileAction::archive("duplicates.zip"))
        .await
        .unwrap();
    assert_eq!(report.archive_name.as_deref(), Some("duplicates.zip"));
    assert!(coordinator.groups().is_empty());
    assert!(store.contains("/Archives/duplicates.zip"));
    assert!(!store.contains("/Documents/document.pdf"));

    coordinator.undo().await.unwrap();
    assert_eq!(coordinator.groups(), demo_groups());
    assert!(store.contains("/Documents/document.pdf"));
    assert!(!store.contains("/Archives/duplicates.zip"));
}

#[tokio::test]
async fn test_archive_action_uses_configured_name() {
    let store = demo_store();
    let config = CoordinatorConfig::builder()
        .default_archive_name("dupes.zip")
        .build()
        .unwrap();
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm))
            .with_config(config);

    assert_eq!(
        coordinator.archive_action(Some("named.zip".to_string())),
        FileAction::archive("named.zip")
    );

    let action = coordinator.archive_action(None);
    assert_eq!(action, FileAction::archive("dupes.zip"));
    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, action)
        .await
        .unwrap();

    assert_eq!(report.archive_name.as_deref(), Some("dupes.zip"));
    assert!(store.contains("/Archives/dupes.zip"));
}

#[tokio::test]
async fn test_undo_without_restore_keeps_group_view() {
    let store = demo_store();
    let config = CoordinatorConfig::builder()
        .restore_groups_on_undo(false)
        .build()
        .unwrap();
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm))
            .with_config(config);

    coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();
    coordinator.undo().await.unwrap();

    assert!(coordinator.groups().is_empty());
    assert!(store.contains("/Downloads/document_copy.pdf"));
}

#[tokio::test]
async fn test_failed_undo_keeps_pending_action() {
    let executor = Arc::new(ScriptedExecutor::default());
    let coordinator = coordinator_with(executor.clone(), demo_groups());
    coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    *executor.undo_result.lock().unwrap() = Some(ExecutorError::no_op("trash emptied"));
    let err = coordinator.undo().await.unwrap_err();
    assert!(matches!(err, BatchError::UndoRejected { .. }));
    assert!(coordinator.pending_action().is_some());

    *executor.undo_result.lock().unwrap() = None;
    coordinator.undo().await.unwrap();
    assert!(coordinator.pending_action().is_none());
}

#[tokio::test]
async fn test_move_records_relocations() {
    let store = demo_store();
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm));

    coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::move_to("/Sorted"))
        .await
        .unwrap();

    let pending = coordinator.pending_action().unwrap();
    assert_eq!(pending.destination(), Some("/Sorted"));
    assert!(pending.relocations.contains(&(
        "/Downloads/image_copy.jpg".to_string(),
        "/Sorted/image_copy.jpg".to_string()
    )));
    assert!(store.contains("/Sorted/document_copy.pdf"));
}

#[tokio::test]
async fn test_missing_store_file_is_partial_failure() {
    let store = demo_store();
    store.remove("/Backups/image_backup.jpg");
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store.clone(), Arc::new(AlwaysConfirm));

    let report = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap();

    assert_eq!(
        report.failure_messages(),
        vec!["notFound: /Backups/image_backup.jpg".to_string()]
    );
    assert_eq!(report.succeeded.len(), 2);
}

#[tokio::test]
async fn test_concurrent_call_is_busy() {
    let store = Arc::new(
        MemoryStore::with_files(demo_store_entries()).with_latency(Duration::from_millis(50)),
    );
    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store, Arc::new(AlwaysConfirm));

    let first = async {
        coordinator
            .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
            .await
    };
    let second = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(coordinator.is_busy());
        coordinator.undo().await
    };

    let (first, second) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), BatchError::Busy);
    assert!(!coordinator.is_busy());
    assert!(coordinator.pending_action().is_some());
}

#[tokio::test]
async fn test_executor_timeout() {
    let store = Arc::new(
        MemoryStore::with_files(demo_store_entries()).with_latency(Duration::from_millis(200)),
    );
    let config = CoordinatorConfig::builder()
        .executor_timeout_ms(20u64)
        .build()
        .unwrap();
    let coordinator = BatchCoordinator::with_store(demo_groups(), store, Arc::new(AlwaysConfirm))
        .with_config(config);

    let err = coordinator
        .execute_batch(RetentionStrategy::Newest, FileAction::Delete)
        .await
        .unwrap_err();

    assert!(matches!(&err, BatchError::Transport { message } if message.contains("timed out")));
    assert_eq!(coordinator.groups(), demo_groups());
    assert!(!coordinator.is_busy());
}
