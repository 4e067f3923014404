//! Ports to the systems that actually touch storage.
//!
//! The coordinator never performs file operations itself. It hands an
//! [`ActionRequest`] to a [`FileActionExecutor`] and a recorded
//! [`PendingAction`] to an [`UndoExecutor`]. Executors report per-path
//! outcomes and keep processing after a path fails; an `Err` return means the
//! call as a whole did not happen.

use std::future::Future;
use std::pin::Pin;

use declutter_core::ExecutorError;

use crate::action::{ActionRequest, ActionResponse};
use crate::undo::PendingAction;

/// Type alias for boxed futures returned by executor methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Applies delete, move, and archive actions.
pub trait FileActionExecutor: Send + Sync {
    /// Apply the request's action to each of its paths.
    ///
    /// The response should carry one outcome per requested path.
    fn execute<'a>(
        &'a self,
        request: &'a ActionRequest,
    ) -> BoxFuture<'a, Result<ActionResponse, ExecutorError>>;
}

/// Reverses the most recently completed action.
pub trait UndoExecutor: Send + Sync {
    /// Reverse a recorded action. Fails with `NoOp` if there is nothing to reverse.
    fn undo<'a>(&'a self, action: &'a PendingAction) -> BoxFuture<'a, Result<(), ExecutorError>>;
}

/// A file resolved from a backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub content: Vec<u8>,
}

impl StoredFile {
    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Final path component.
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }
}

/// Resolves paths against a backing store.
pub trait FileLookup: Send + Sync {
    /// Returns `None` if the path does not exist.
    fn lookup(&self, path: &str) -> Option<StoredFile>;
}

/// Final component of a slash-separated path.
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Join a folder and a file name with a single separator.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
