//! Retention strategies.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Decides which member of a duplicate group is kept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RetentionStrategy {
    /// Keep the most recently modified file.
    Newest,
    /// Keep the least recently modified file.
    Oldest,
    /// Keep the files the user selected.
    #[default]
    Manual,
}

impl RetentionStrategy {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Keep Newest",
            Self::Oldest => "Keep Oldest",
            Self::Manual => "Manual Selection",
        }
    }

    /// Whether this strategy depends on a manual selection.
    pub fn needs_selection(&self) -> bool {
        matches!(self, Self::Manual)
    }
}
