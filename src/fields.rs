//! Enumerations and field types for the task list.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority tag for a task. Display-only classification with no scheduling
/// effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Cycle to the next priority value. Used by the TUI selector.
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

/// View over the task collection. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FilterMode {
    All,
    Completed,
    Pending,
}

impl FilterMode {
    /// Cycle to the next filter mode. Used by the TUI tabs.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Completed,
            FilterMode::Completed => FilterMode::Pending,
            FilterMode::Pending => FilterMode::All,
        }
    }
}
