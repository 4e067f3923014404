//! Batch action kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The kind of batch action applied to surplus files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Delete,
    Move,
    Archive,
}

impl ActionKind {
    /// Past-tense verb for status messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Delete => "Deleted",
            Self::Move => "Moved",
            Self::Archive => "Archived",
        }
    }
}
