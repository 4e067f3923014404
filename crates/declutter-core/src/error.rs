//! Error types for batch actions and their executors.

use thiserror::Error;

/// Errors returned by an external action or undo executor.
///
/// These describe failures of the call itself. Per-path problems are reported
/// as outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The call could not be completed at all.
    #[error("Executor transport error: {message}")]
    Transport { message: String },

    /// The archive could not be produced.
    #[error("Failed to create archive: {message}")]
    ArchiveCreation { message: String },

    /// The executor had nothing to reverse.
    #[error("Nothing to undo: {message}")]
    NoOp { message: String },
}

impl ExecutorError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn archive_creation(message: impl Into<String>) -> Self {
        Self::ArchiveCreation {
            message: message.into(),
        }
    }

    pub fn no_op(message: impl Into<String>) -> Self {
        Self::NoOp {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the batch action coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Manual strategy with nothing selected.
    #[error("Please select files or choose a different strategy")]
    NoSelection,

    /// The strategy left no surplus files.
    #[error("No files to process")]
    NothingToProcess,

    /// The confirmation gate was declined.
    #[error("Action cancelled")]
    Cancelled,

    /// The action is missing a required parameter.
    #[error("Invalid action: {message}")]
    InvalidAction { message: String },

    /// Undo was requested with an empty history slot.
    #[error("No action to undo")]
    NoPendingAction,

    /// The executor failed to produce the archive.
    #[error("Failed to create archive: {message}")]
    ArchiveCreation { message: String },

    /// The executor call itself failed or timed out.
    #[error("Executor error: {message}")]
    Transport { message: String },

    /// The undo executor refused to reverse the pending action.
    #[error("Undo failed: {message}")]
    UndoRejected { message: String },

    /// Another batch or undo call is still outstanding.
    #[error("Another action is still in progress")]
    Busy,
}

impl BatchError {
    /// Create an invalid action error.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::InvalidAction {
            message: message.into(),
        }
    }

    /// Map an error from the action executor.
    pub fn from_action_executor(err: ExecutorError) -> Self {
        match err {
            ExecutorError::ArchiveCreation { message } => Self::ArchiveCreation { message },
            ExecutorError::Transport { message } | ExecutorError::NoOp { message } => {
                Self::Transport { message }
            }
        }
    }

    /// Map an error from the undo executor.
    pub fn from_undo_executor(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Transport { message } => Self::Transport { message },
            ExecutorError::NoOp { message } | ExecutorError::ArchiveCreation { message } => {
                Self::UndoRejected { message }
            }
        }
    }
}
