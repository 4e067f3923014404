//! Manual file selection.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::FileId;

/// File ids marked by the user, in the order they were marked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: IndexSet<FileId>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection state of an id.
    ///
    /// Returns true if the id is selected afterwards.
    pub fn toggle(&mut self, id: FileId) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select an id. Returns false if it was already selected.
    pub fn insert(&mut self, id: FileId) -> bool {
        self.ids.insert(id)
    }

    /// Deselect an id. Returns false if it was not selected.
    pub fn remove(&mut self, id: &FileId) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate over selected ids in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &FileId> {
        self.ids.iter()
    }
}

impl<T: Into<FileId>> FromIterator<T> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
