//! Duplicate file and group types.

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Identifier of a file within its duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub CompactString);

impl FileId {
    /// Create a new FileId.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(CompactString::new(id))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for FileId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// A single member of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateFile {
    /// Unique within the owning group.
    pub id: FileId,
    /// Display name.
    pub name: CompactString,
    /// Full path, unique across the system. Used to address batch actions.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

impl DuplicateFile {
    /// Create a new duplicate file entry.
    pub fn new(
        id: impl Into<FileId>,
        name: impl AsRef<str>,
        path: impl Into<String>,
        size: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: CompactString::new(name),
            path: path.into(),
            size,
            last_modified,
        }
    }
}

/// A set of files believed to share the same content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Unique group id.
    pub id: String,
    /// Member files in stored order.
    pub files: Vec<DuplicateFile>,
}

impl DuplicateGroup {
    /// Create a new group.
    pub fn new(id: impl Into<String>, files: Vec<DuplicateFile>) -> Self {
        Self {
            id: id.into(),
            files,
        }
    }

    /// Number of files in the group.
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// A group needs at least two members to still be a duplicate group.
    pub fn is_duplicate(&self) -> bool {
        self.files.len() > 1
    }

    /// Check whether a file id belongs to this group.
    pub fn contains(&self, id: &FileId) -> bool {
        self.files.iter().any(|f| &f.id == id)
    }

    /// Look up a member by path.
    pub fn file_by_path(&self, path: &str) -> Option<&DuplicateFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Sum of all member sizes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Space reclaimable by keeping only the largest member.
    pub fn wasted_bytes(&self) -> u64 {
        let largest = self.files.iter().map(|f| f.size).max().unwrap_or(0);
        self.total_size() - largest
    }

    /// Remove every member whose path satisfies the predicate.
    ///
    /// Returns the number of removed files.
    pub fn remove_paths<F>(&mut self, mut is_removed: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.files.len();
        self.files.retain(|f| !is_removed(&f.path));
        before - self.files.len()
    }
}
