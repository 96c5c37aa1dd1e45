//! Task data structure.
//!
//! This module defines the `Task` struct that represents a single to-do
//! entry with its priority tag and creation time.

use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// A single to-do entry.
///
/// The `id` is derived from the creation instant in milliseconds, which
/// keeps ids unique and roughly chronological. Position in the collection
/// is the user's manual order and is persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at_utc: i64,
}
