//! Batch file actions for declutter.
//!
//! This crate applies delete, move, and archive actions to the surplus files
//! of duplicate groups through pluggable executors, and keeps a single-step
//! undo of the last completed action. [`MemoryStore`] is an in-memory backing
//! store implementing both executor ports.

mod action;
mod confirm;
mod coordinator;
mod executor;
mod report;
mod store;
mod undo;

pub use action::{ActionRequest, ActionResponse, FileAction, OutcomeStatus, PathOutcome};
pub use confirm::{AlwaysConfirm, Confirm, ConfirmRequest, NeverConfirm};
pub use coordinator::BatchCoordinator;
pub use executor::{
    BoxFuture, FileActionExecutor, FileLookup, StoredFile, UndoExecutor, base_name, join_path,
};
pub use report::{BatchReport, FailureReason, PathFailure};
pub use store::MemoryStore;
pub use undo::{PendingAction, UndoEntry, UndoSlot};

// Re-export core types
pub use declutter_core::{ActionKind, BatchError, CoordinatorConfig, ExecutorError};
