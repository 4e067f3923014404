//! Confirmation gate run before any side effect.

use std::fmt;

use declutter_core::ActionKind;

/// What the user is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub kind: ActionKind,
    /// Paths that will be acted upon.
    pub paths: Vec<String>,
}

impl ConfirmRequest {
    pub fn new(kind: ActionKind, paths: Vec<String>) -> Self {
        Self { kind, paths }
    }

    pub fn file_count(&self) -> usize {
        self.paths.len()
    }
}

impl fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Are you sure you want to {} {} file(s)?",
            self.kind,
            self.file_count()
        )
    }
}

/// A synchronous yes/no decision.
pub trait Confirm: Send + Sync {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmRequest) -> bool + Send + Sync,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Approves every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Declines every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        false
    }
}
