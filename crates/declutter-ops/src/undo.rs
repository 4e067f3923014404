//! Single-slot history of the last completed batch action.

use serde::{Deserialize, Serialize};

use declutter_core::{ActionKind, DuplicateGroup};

use crate::action::FileAction;

/// The most recently completed batch action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    /// The action that was applied, with its destination or archive name.
    pub action: FileAction,
    /// Paths the action succeeded on, in processing order.
    pub file_paths: Vec<String>,
    /// (original_path, new_path) pairs for moves.
    #[serde(default)]
    pub relocations: Vec<(String, String)>,
}

impl PendingAction {
    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    /// Destination folder or archive name.
    pub fn destination(&self) -> Option<&str> {
        self.action.target()
    }

    /// Get a description of how to undo this action.
    pub fn undo_description(&self) -> String {
        let count = self.file_paths.len();
        match &self.action {
            FileAction::Delete => format!("Restore {} deleted items", count),
            FileAction::Move { .. } => {
                format!("Move {} items back to original location", count)
            }
            FileAction::Archive { archive_name } => {
                format!("Restore {} items from '{}'", count, archive_name)
            }
        }
    }
}

/// A recorded action plus the group view it replaced.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub action: PendingAction,
    /// Active groups immediately before the action.
    pub groups_before: Vec<DuplicateGroup>,
}

/// Undo history with capacity one. Recording replaces the previous entry.
#[derive(Debug, Default)]
pub struct UndoSlot {
    entry: Option<UndoEntry>,
}

impl UndoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action, discarding whatever was recorded before.
    pub fn record(&mut self, action: PendingAction, groups_before: Vec<DuplicateGroup>) {
        self.entry = Some(UndoEntry {
            action,
            groups_before,
        });
    }

    /// Peek at the recorded entry without removing it.
    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entry.as_ref()
    }

    /// Remove and return the recorded entry.
    pub fn take(&mut self) -> Option<UndoEntry> {
        self.entry.take()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
