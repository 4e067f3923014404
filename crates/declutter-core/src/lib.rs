//! Core types and configuration for declutter.
//!
//! This crate provides the data model shared by the resolution engine and the
//! batch action coordinator: duplicate files and groups, retention strategies,
//! manual selections, the error taxonomy, and coordinator configuration.

mod action;
mod config;
mod error;
pub mod fixtures;
mod group;
mod selection;
mod strategy;

pub use action::ActionKind;
pub use config::{ConfigError, CoordinatorConfig, CoordinatorConfigBuilder};
pub use error::{BatchError, ExecutorError};
pub use group::{DuplicateFile, DuplicateGroup, FileId};
pub use selection::SelectionSet;
pub use strategy::RetentionStrategy;
