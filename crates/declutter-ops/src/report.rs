//! Outcome of a batch action.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::action::FileAction;

/// Why a path was not processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum FailureReason {
    NotFound,
    Error { message: String },
}

/// A path the executor did not apply the action to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFailure {
    pub path: String,
    #[serde(flatten)]
    pub reason: FailureReason,
}

impl fmt::Display for PathFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::NotFound => write!(f, "notFound: {}", self.path),
            FailureReason::Error { message } => write!(f, "error: {}: {}", self.path, message),
        }
    }
}

/// Result of a batch action that reached the executor.
///
/// Successful paths are committed even when some paths failed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub action: FileAction,
    /// Number of paths sent to the executor.
    pub requested: usize,
    /// Paths the action was applied to.
    pub succeeded: Vec<String>,
    /// Paths that failed, in request order.
    pub failures: Vec<PathFailure>,
    /// Archive created by the executor, for archive actions.
    pub archive_name: Option<String>,
    /// Ids of groups dropped because one file or fewer remained.
    pub groups_removed: Vec<String>,
}

impl BatchReport {
    /// Check if any path failed.
    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Check if the action was applied to at least one path.
    pub fn has_successes(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// One message per failed path.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let verb = self.action.kind().past_tense();
        if self.failures.is_empty() {
            format!("Successfully {} {} file(s)", verb.to_lowercase(), self.succeeded.len())
        } else {
            format!(
                "{} {} of {} file(s). Some errors occurred: {}",
                verb,
                self.succeeded.len(),
                self.requested,
                self.failures.iter().join(", ")
            )
        }
    }
}
