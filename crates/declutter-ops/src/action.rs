//! Batch action types and executor request/response shapes.

use serde::{Deserialize, Serialize};

use declutter_core::{ActionKind, BatchError};

/// A batch action together with the parameters it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileAction {
    /// Delete the files.
    Delete,
    /// Move the files into a folder.
    Move { destination: String },
    /// Pack the files into an archive.
    Archive { archive_name: String },
}

impl FileAction {
    /// Create a move action.
    pub fn move_to(destination: impl Into<String>) -> Self {
        Self::Move {
            destination: destination.into(),
        }
    }

    /// Create an archive action.
    pub fn archive(archive_name: impl Into<String>) -> Self {
        Self::Archive {
            archive_name: archive_name.into(),
        }
    }

    /// The kind of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Delete => ActionKind::Delete,
            Self::Move { .. } => ActionKind::Move,
            Self::Archive { .. } => ActionKind::Archive,
        }
    }

    /// Destination folder or archive name, if the action has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Delete => None,
            Self::Move { destination } => Some(destination.as_str()),
            Self::Archive { archive_name } => Some(archive_name.as_str()),
        }
    }

    /// Check that required parameters are present.
    pub fn validate(&self) -> Result<(), BatchError> {
        match self {
            Self::Delete => Ok(()),
            Self::Move { destination } if destination.trim().is_empty() => Err(
                BatchError::invalid_action("move requires a destination folder name"),
            ),
            Self::Archive { archive_name } if archive_name.trim().is_empty() => {
                Err(BatchError::invalid_action("archive requires an archive name"))
            }
            _ => Ok(()),
        }
    }
}

/// A request sent to a [`FileActionExecutor`](crate::FileActionExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: FileAction,
    /// Paths to act upon, in processing order.
    pub paths: Vec<String>,
}

/// Result of applying an action to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OutcomeStatus {
    /// The action was applied. Moves report where the file went.
    Applied { new_path: Option<String> },
    /// The path does not exist in the backing store.
    NotFound,
    /// The backing store failed for this path.
    Error { message: String },
}

/// Per-path outcome reported by an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub path: String,
    pub status: OutcomeStatus,
}

impl PathOutcome {
    pub fn applied(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: OutcomeStatus::Applied { new_path: None },
        }
    }

    pub fn moved(path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: OutcomeStatus::Applied {
                new_path: Some(new_path.into()),
            },
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: OutcomeStatus::NotFound,
        }
    }

    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: OutcomeStatus::Error {
                message: message.into(),
            },
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied { .. })
    }
}

/// Response from a [`FileActionExecutor`](crate::FileActionExecutor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub outcomes: Vec<PathOutcome>,
    /// Name of the created archive, for archive actions.
    pub archive_name: Option<String>,
}
