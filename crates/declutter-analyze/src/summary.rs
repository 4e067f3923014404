//! Totals over a set of duplicate groups.

use serde::Serialize;

use declutter_core::DuplicateGroup;

/// Aggregate statistics for the active duplicate groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Number of groups.
    pub group_count: usize,
    /// Number of files across all groups.
    pub file_count: usize,
    /// Size of every file across all groups.
    pub total_size: u64,
    /// Space reclaimable by keeping one file per group.
    pub wasted_bytes: u64,
}

impl GroupSummary {
    /// Summarize a list of groups.
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        groups.iter().fold(Self::default(), |acc, g| Self {
            group_count: acc.group_count + 1,
            file_count: acc.file_count + g.count(),
            total_size: acc.total_size + g.total_size(),
            wasted_bytes: acc.wasted_bytes + g.wasted_bytes(),
        })
    }

    /// Check if any duplicates remain.
    pub fn has_duplicates(&self) -> bool {
        self.group_count > 0
    }
}
