//! Batch action coordinator.
//!
//! Owns the active duplicate groups, the manual selection, and the undo slot.
//! State is only changed by [`BatchCoordinator::execute_batch`] and
//! [`BatchCoordinator::undo`], and only one of those may be outstanding at a
//! time. The state lock is never held across an executor call.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use declutter_analyze::Resolver;
use declutter_core::{
    BatchError, CoordinatorConfig, DuplicateGroup, ExecutorError, FileId, RetentionStrategy,
    SelectionSet,
};

use crate::action::{ActionRequest, ActionResponse, FileAction, OutcomeStatus};
use crate::confirm::{Confirm, ConfirmRequest};
use crate::executor::{FileActionExecutor, UndoExecutor};
use crate::report::{BatchReport, FailureReason, PathFailure};
use crate::store::MemoryStore;
use crate::undo::{PendingAction, UndoSlot};

#[derive(Debug, Default)]
struct CoordinatorState {
    groups: Vec<DuplicateGroup>,
    selection: SelectionSet,
    undo: UndoSlot,
}

/// Resets the in-flight flag when the call finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, BatchError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| BatchError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Applies batch actions to surplus duplicates and keeps a one-step undo.
pub struct BatchCoordinator {
    executor: Arc<dyn FileActionExecutor>,
    undo_executor: Arc<dyn UndoExecutor>,
    confirm: Arc<dyn Confirm>,
    config: CoordinatorConfig,
    state: Mutex<CoordinatorState>,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Create a coordinator over an initial set of groups.
    pub fn new(
        groups: Vec<DuplicateGroup>,
        executor: Arc<dyn FileActionExecutor>,
        undo_executor: Arc<dyn UndoExecutor>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            executor,
            undo_executor,
            confirm,
            config: CoordinatorConfig::default(),
            state: Mutex::new(CoordinatorState {
                groups,
                ..Default::default()
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create a coordinator backed by an in-memory store for both actions and undo.
    pub fn with_store(
        groups: Vec<DuplicateGroup>,
        store: Arc<MemoryStore>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self::new(groups, store.clone(), store, confirm)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Archive action under `archive_name`, or the configured default name.
    pub fn archive_action(&self, archive_name: Option<String>) -> FileAction {
        FileAction::archive(
            archive_name.unwrap_or_else(|| self.config.default_archive_name.clone()),
        )
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the active groups.
    pub fn groups(&self) -> Vec<DuplicateGroup> {
        self.state().groups.clone()
    }

    /// Snapshot of the manual selection.
    pub fn selection(&self) -> SelectionSet {
        self.state().selection.clone()
    }

    /// The action the next undo would reverse.
    pub fn pending_action(&self) -> Option<PendingAction> {
        self.state().undo.peek().map(|entry| entry.action.clone())
    }

    /// True while a batch or undo call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Flip the selection state of a file. Returns true if it is now selected.
    pub fn toggle_selection(&self, id: impl Into<FileId>) -> bool {
        self.state().selection.toggle(id.into())
    }

    /// Mark a file as selected.
    pub fn select(&self, id: impl Into<FileId>) {
        self.state().selection.insert(id.into());
    }

    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }

    /// Apply `action` to the surplus files chosen by `strategy`.
    ///
    /// The selection is cleared once the call finishes, whatever the outcome.
    pub async fn execute_batch(
        &self,
        strategy: RetentionStrategy,
        action: FileAction,
    ) -> Result<BatchReport, BatchError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let result = self.run_batch(strategy, action).await;
        self.state().selection.clear();

        match &result {
            Ok(report) if report.is_partial_failure() => warn!(
                kind = %report.action.kind(),
                succeeded = report.succeeded.len(),
                failed = report.failures.len(),
                "batch action partially failed"
            ),
            Ok(report) => info!(
                kind = %report.action.kind(),
                succeeded = report.succeeded.len(),
                "batch action complete"
            ),
            Err(err) => warn!(error = %err, "batch action not applied"),
        }

        result
    }

    async fn run_batch(
        &self,
        strategy: RetentionStrategy,
        action: FileAction,
    ) -> Result<BatchReport, BatchError> {
        let (paths, groups_before) = {
            let state = self.state();
            if strategy.needs_selection() && state.selection.is_empty() {
                return Err(BatchError::NoSelection);
            }
            action.validate()?;

            let plan = Resolver::new(strategy).plan(&state.groups, &state.selection);
            (plan.surplus_paths(), state.groups.clone())
        };

        if paths.is_empty() {
            return Err(BatchError::NothingToProcess);
        }

        let confirm_request = ConfirmRequest::new(action.kind(), paths);
        if !self.confirm.confirm(&confirm_request) {
            debug!(kind = %action.kind(), "batch action declined");
            return Err(BatchError::Cancelled);
        }

        let request = ActionRequest {
            action,
            paths: confirm_request.paths,
        };
        let response = self
            .call(self.executor.execute(&request))
            .await
            .map_err(BatchError::from_action_executor)?;

        let archive_name = response.archive_name.clone();
        let (succeeded, relocations, failures) = partition(&request.paths, response);
        for failure in &failures {
            warn!(path = %failure.path, "{}", failure);
        }

        let ActionRequest { action, paths } = request;
        let mut state = self.state();
        let done: HashSet<&str> = succeeded.iter().map(String::as_str).collect();
        for group in &mut state.groups {
            group.remove_paths(|p| done.contains(p));
        }

        let mut groups_removed = Vec::new();
        state.groups.retain(|g| {
            let keep = g.is_duplicate();
            if !keep {
                groups_removed.push(g.id.clone());
            }
            keep
        });

        if !succeeded.is_empty() {
            let pending = PendingAction {
                action: action.clone(),
                file_paths: succeeded.clone(),
                relocations,
            };
            state.undo.record(pending, groups_before);
        }

        Ok(BatchReport {
            action,
            requested: paths.len(),
            succeeded,
            failures,
            archive_name,
            groups_removed,
        })
    }

    /// Reverse the last successful batch action.
    ///
    /// Returns the action that was reversed. On failure the action stays
    /// recorded so the undo can be retried.
    pub async fn undo(&self) -> Result<PendingAction, BatchError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let pending = self
            .pending_action()
            .ok_or(BatchError::NoPendingAction)?;

        if let Err(err) = self.call(self.undo_executor.undo(&pending)).await {
            warn!(kind = %pending.kind(), error = %err, "undo failed");
            return Err(BatchError::from_undo_executor(err));
        }

        let mut state = self.state();
        if let Some(entry) = state.undo.take() {
            if self.config.restore_groups_on_undo {
                state.groups = entry.groups_before;
            }
        }

        info!(kind = %pending.kind(), files = pending.file_paths.len(), "undo successful");
        Ok(pending)
    }

    /// Run an executor call under the configured timeout.
    async fn call<T, F>(&self, call: F) -> Result<T, ExecutorError>
    where
        F: Future<Output = Result<T, ExecutorError>>,
    {
        match self.config.executor_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(timed_out(limit))),
            None => call.await,
        }
    }
}

fn timed_out(limit: Duration) -> ExecutorError {
    ExecutorError::transport(format!("timed out after {}ms", limit.as_millis()))
}

/// Split executor outcomes into succeeded paths, move relocations, and failures.
///
/// Requested paths without an outcome count as failures; outcomes for paths
/// that were never requested are ignored.
fn partition(
    requested: &[String],
    response: ActionResponse,
) -> (Vec<String>, Vec<(String, String)>, Vec<PathFailure>) {
    let mut by_path: HashMap<String, OutcomeStatus> = HashMap::new();
    for outcome in response.outcomes {
        by_path.entry(outcome.path).or_insert(outcome.status);
    }

    let mut succeeded = Vec::new();
    let mut relocations = Vec::new();
    let mut failures = Vec::new();

    for path in requested {
        match by_path.remove(path) {
            Some(OutcomeStatus::Applied { new_path }) => {
                if let Some(new_path) = new_path {
                    relocations.push((path.clone(), new_path));
                }
                succeeded.push(path.clone());
            }
            Some(OutcomeStatus::NotFound) => failures.push(PathFailure {
                path: path.clone(),
                reason: FailureReason::NotFound,
            }),
            Some(OutcomeStatus::Error { message }) => failures.push(PathFailure {
                path: path.clone(),
                reason: FailureReason::Error { message },
            }),
            None => failures.push(PathFailure {
                path: path.clone(),
                reason: FailureReason::Error {
                    message: "no outcome reported".to_string(),
                },
            }),
        }
    }

    (succeeded, relocations, failures)
}
