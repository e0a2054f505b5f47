//! Lifecycle states of one cache version.

use serde::Serialize;
use std::fmt;

/// Lifecycle state of a [`CacheManager`](crate::CacheManager).
///
/// `Installing → Installed → Activating → Active`; a failed install stays in
/// `Installing`. A superseded version ends in `Redundant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }

    /// Only an active version intercepts fetches.
    pub fn handles_fetch(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
