//! Retention strategies for duplicate groups.
//!
//! This crate decides, for each group of duplicate files, which files are
//! kept and which are surplus:
//!
//! - **Newest** - keep the most recently modified file
//! - **Oldest** - keep the least recently modified file
//! - **Manual** - keep whatever the user selected in that group
//!
//! ```rust,ignore
//! use declutter_analyze::Resolver;
//! use declutter_core::{fixtures, RetentionStrategy, SelectionSet};
//!
//! let groups = fixtures::demo_groups();
//! let plan = Resolver::new(RetentionStrategy::Oldest).plan(&groups, &SelectionSet::new());
//!
//! for path in plan.surplus_paths() {
//!     println!("surplus: {path}");
//! }
//! ```

mod resolve;
mod summary;

pub use resolve::{GroupResolution, ResolutionPlan, Resolver};
pub use summary::GroupSummary;

// Re-export core types
pub use declutter_core::{DuplicateFile, DuplicateGroup, FileId, RetentionStrategy, SelectionSet};
