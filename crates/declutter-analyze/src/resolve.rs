//! Retention strategies applied to duplicate groups.
//!
//! A [`Resolver`] turns a group into a keep set and a surplus list. Under
//! `Newest` and `Oldest` exactly one file is kept; ties go to the file that
//! appears first in the group. Under `Manual` the keep set is the part of the
//! user's selection that belongs to the group, which may be empty. The
//! resolver never enforces "keep at least one"; callers decide whether an
//! empty selection is acceptable.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use declutter_core::{DuplicateFile, DuplicateGroup, FileId, RetentionStrategy, SelectionSet};

/// Keep and surplus decision for one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResolution {
    /// The resolved group.
    pub group_id: String,
    /// Ids of the files to keep.
    pub keep: Vec<FileId>,
    /// Files to act upon, in group order.
    pub surplus: Vec<DuplicateFile>,
}

impl GroupResolution {
    /// Bytes freed by acting on the surplus.
    pub fn surplus_bytes(&self) -> u64 {
        self.surplus.iter().map(|f| f.size).sum()
    }

    /// True if every member of the group is surplus.
    pub fn keeps_nothing(&self) -> bool {
        self.keep.is_empty()
    }
}

/// Resolutions for a list of groups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionPlan {
    /// One entry per group, in group order.
    pub groups: Vec<GroupResolution>,
}

impl ResolutionPlan {
    /// Surplus paths flattened in group order, then in-group order.
    pub fn surplus_paths(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.surplus.iter().map(|f| f.path.clone()))
            .collect()
    }

    /// Total number of surplus files.
    pub fn surplus_count(&self) -> usize {
        self.groups.iter().map(|g| g.surplus.len()).sum()
    }

    /// Total bytes freed by acting on every surplus file.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.iter().map(GroupResolution::surplus_bytes).sum()
    }

    /// True if there is nothing to act upon.
    pub fn is_empty(&self) -> bool {
        self.surplus_count() == 0
    }
}

/// Applies a retention strategy to duplicate groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    strategy: RetentionStrategy,
}

impl Resolver {
    /// Create a resolver for a strategy.
    pub fn new(strategy: RetentionStrategy) -> Self {
        Self { strategy }
    }

    /// The strategy this resolver applies.
    pub fn strategy(&self) -> RetentionStrategy {
        self.strategy
    }

    /// Ids of the files to keep in a group.
    ///
    /// The selection is only consulted under `Manual`.
    pub fn keep_set(&self, group: &DuplicateGroup, selection: &SelectionSet) -> Vec<FileId> {
        match self.strategy {
            RetentionStrategy::Newest => first_extreme(&group.files, Ordering::Greater),
            RetentionStrategy::Oldest => first_extreme(&group.files, Ordering::Less),
            RetentionStrategy::Manual => selection
                .iter()
                .filter(|id| group.contains(id))
                .cloned()
                .collect(),
        }
    }

    /// Files of a group that are not kept, in group order.
    pub fn surplus<'g>(
        &self,
        group: &'g DuplicateGroup,
        selection: &SelectionSet,
    ) -> Vec<&'g DuplicateFile> {
        let keep = self.keep_set(group, selection);
        group
            .files
            .iter()
            .filter(|f| !keep.contains(&f.id))
            .collect()
    }

    /// Resolve a single group.
    pub fn resolve(&self, group: &DuplicateGroup, selection: &SelectionSet) -> GroupResolution {
        let keep = self.keep_set(group, selection);
        let surplus = group
            .files
            .iter()
            .filter(|f| !keep.contains(&f.id))
            .cloned()
            .collect();

        GroupResolution {
            group_id: group.id.clone(),
            keep,
            surplus,
        }
    }

    /// Resolve every group.
    pub fn plan(&self, groups: &[DuplicateGroup], selection: &SelectionSet) -> ResolutionPlan {
        let plan = ResolutionPlan {
            groups: groups.iter().map(|g| self.resolve(g, selection)).collect(),
        };

        debug!(
            strategy = %self.strategy,
            groups = groups.len(),
            surplus = plan.surplus_count(),
            "computed resolution plan"
        );

        plan
    }
}

/// Left-to-right scan; a later file replaces the incumbent only when its
/// timestamp compares strictly as `wins`.
fn first_extreme(files: &[DuplicateFile], wins: Ordering) -> Vec<FileId> {
    let mut iter = files.iter();
    let Some(mut best) = iter.next() else {
        return Vec::new();
    };

    for file in iter {
        if file.last_modified.cmp(&best.last_modified) == wins {
            best = file;
        }
    }

    vec![best.id.clone()]
}
