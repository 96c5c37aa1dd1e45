//! Task store and persistence.
//!
//! This module provides the `Store` struct that owns the ordered task
//! collection and its JSON round-trip, along with the pure filter and the
//! display formatting helpers shared by the CLI and the TUI.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::{FilterMode, Priority};
use crate::task::Task;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task text cannot be empty")]
    EmptyText,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("serializing tasks: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory ordered task collection.
///
/// Order is meaningful: new tasks go to the head, and the user may move
/// tasks around. The order on disk is exactly the in-memory order.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    pub tasks: Vec<Task>,
}

impl Store {
    /// Load the store from a JSON file, returning an empty store when the
    /// file is missing, unreadable or malformed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing task file, starting fresh: {e}");
                    Store::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading task file, starting fresh: {e}");
                Store::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the id for a new task: the current instant in milliseconds,
    /// bumped past the newest existing id if the clock has not moved.
    fn next_id(&self) -> u64 {
        let now = Utc::now().timestamp_millis() as u64;
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        now.max(max + 1)
    }

    /// Get a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task and prepend it, newest first.
    ///
    /// The text is trimmed; an empty result is rejected and the collection
    /// is left unchanged.
    pub fn create(&mut self, text: &str, priority: Priority) -> Result<&Task, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let task = Task {
            id: self.next_id(),
            text: text.to_string(),
            priority,
            completed: false,
            created_at_utc: Utc::now().timestamp(),
        };
        self.tasks.insert(0, task);
        Ok(&self.tasks[0])
    }

    /// Flip the completion flag on the matching task. Unknown ids are a
    /// no-op returning `false`.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.completed = !t.completed;
                true
            }
            None => false,
        }
    }

    /// Remove the matching task. Unknown ids are a no-op returning `false`.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Move the task `from_id` next to the task `to_id`.
    ///
    /// Both positions are looked up before removal, so moving forward lands
    /// the task immediately after the target and moving backward lands it
    /// immediately before. Unknown ids and `from_id == to_id` are no-ops.
    pub fn reorder(&mut self, from_id: u64, to_id: u64) -> bool {
        if from_id == to_id {
            return false;
        }
        let Some(from) = self.tasks.iter().position(|t| t.id == from_id) else {
            return false;
        };
        let Some(to) = self.tasks.iter().position(|t| t.id == to_id) else {
            return false;
        };
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    /// Remove every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

/// Select a view over the tasks. Pure and order-preserving: `All` keeps the
/// full sequence, `Completed` and `Pending` keep stable subsequences.
pub fn filter_tasks(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| match mode {
            FilterMode::All => true,
            FilterMode::Completed => t.completed,
            FilterMode::Pending => !t.completed,
        })
        .collect()
}

/// Format a priority tag for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format a filter mode for display.
pub fn format_filter(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "All",
        FilterMode::Completed => "Completed",
        FilterMode::Pending => "Pending",
    }
}

/// Humanize the age of a task relative to `now_utc`, both Unix seconds.
/// Falls back to the absolute local date once a week has passed. Recomputed
/// on every render, never stored.
pub fn format_age(created_at_utc: i64, now_utc: i64) -> String {
    let seconds = (now_utc - created_at_utc).max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if seconds < 60 {
        "now".into()
    } else if minutes < 60 {
        format!("{minutes}min ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        match Utc.timestamp_opt(created_at_utc, 0).single() {
            Some(dt) => dt.with_timezone(&Local).format("%d/%m/%Y").to_string(),
            None => format!("{days}d ago"),
        }
    }
}

/// Total and completed counts with singular/plural phrasing.
pub fn format_stats(tasks: &[Task]) -> (String, String) {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let noun = if total == 1 { "task" } else { "tasks" };
    (format!("{total} {noun}"), format!("{completed} completed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store_with(texts: &[&str]) -> Store {
        let mut store = Store::default();
        // create() prepends, so insert in reverse to read top-down.
        for text in texts.iter().rev() {
            store.create(text, Priority::Medium).unwrap();
        }
        store
    }

    fn texts(store: &Store) -> Vec<&str> {
        store.tasks.iter().map(|t| t.text.as_str()).collect()
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tasklist_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn create_prepends_newest_first() {
        let mut store = Store::default();
        store.create("A", Priority::Low).unwrap();
        store.create("B", Priority::High).unwrap();
        assert_eq!(texts(&store), ["B", "A"]);
        assert_eq!(store.tasks.len(), 2);
        assert!(!store.tasks[0].completed);
    }

    #[test]
    fn create_trims_and_rejects_whitespace_text() {
        let mut store = Store::default();
        assert!(matches!(store.create("   ", Priority::Low), Err(StoreError::EmptyText)));
        assert!(store.tasks.is_empty());

        store.create("  trimmed  ", Priority::Low).unwrap();
        assert_eq!(store.tasks[0].text, "trimmed");
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = store_with(&["A", "B", "C"]);
        store.create("D", Priority::Low).unwrap();
        let mut ids: Vec<u64> = store.tasks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut store = store_with(&["A", "B"]);
        let id = store.tasks[1].id;
        let before = store.tasks.clone();

        assert!(store.toggle(id));
        assert!(store.tasks[1].completed);
        assert!(store.toggle(id));
        assert_eq!(store.tasks, before);
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        let mut store = store_with(&["A"]);
        let before = store.tasks.clone();
        assert!(!store.toggle(9999));
        assert_eq!(store.tasks, before);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut store = store_with(&["A", "B", "C"]);
        let id = store.tasks[1].id;
        assert!(store.delete(id));
        assert_eq!(texts(&store), ["A", "C"]);

        assert!(!store.delete(id));
        assert_eq!(store.tasks.len(), 2);
    }

    #[test]
    fn reorder_forward_lands_after_target() {
        let mut store = store_with(&["A", "B", "C", "D"]);
        let a = store.tasks[0].id;
        let c = store.tasks[2].id;
        assert!(store.reorder(a, c));
        assert_eq!(texts(&store), ["B", "C", "A", "D"]);
    }

    #[test]
    fn reorder_backward_lands_before_target() {
        let mut store = store_with(&["A", "B", "C", "D"]);
        let d = store.tasks[3].id;
        let b = store.tasks[1].id;
        assert!(store.reorder(d, b));
        assert_eq!(texts(&store), ["A", "D", "B", "C"]);
    }

    #[test]
    fn reorder_keeps_count_and_fields() {
        let mut store = store_with(&["A", "B", "C"]);
        let mut before = store.tasks.clone();
        let a = store.tasks[0].id;
        let c = store.tasks[2].id;
        assert!(store.reorder(a, c));
        assert_eq!(store.tasks.len(), 3);
        before.sort_by_key(|t| t.id);
        let mut after = store.tasks.clone();
        after.sort_by_key(|t| t.id);
        assert_eq!(after, before);
    }

    #[test]
    fn reorder_noop_cases() {
        let mut store = store_with(&["A", "B"]);
        let a = store.tasks[0].id;
        let before = store.tasks.clone();
        assert!(!store.reorder(a, a));
        assert!(!store.reorder(a, 9999));
        assert!(!store.reorder(9999, a));
        assert_eq!(store.tasks, before);
    }

    #[test]
    fn clear_empties_the_collection() {
        let mut store = store_with(&["A", "B"]);
        store.clear();
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn filter_all_is_identity() {
        let store = store_with(&["A", "B", "C"]);
        let all = filter_tasks(&store.tasks, FilterMode::All);
        assert_eq!(all.len(), 3);
        assert!(all.iter().zip(&store.tasks).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn filter_partitions_and_preserves_order() {
        let mut store = store_with(&["A", "B", "C", "D"]);
        let b = store.tasks[1].id;
        let d = store.tasks[3].id;
        store.toggle(b);
        store.toggle(d);

        let completed = filter_tasks(&store.tasks, FilterMode::Completed);
        let pending = filter_tasks(&store.tasks, FilterMode::Pending);
        assert_eq!(completed.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), ["B", "D"]);
        assert_eq!(pending.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), ["A", "C"]);
        assert_eq!(completed.len() + pending.len(), store.tasks.len());
    }

    #[test]
    fn priority_labels() {
        assert_eq!(format_priority(Priority::Low), "Low");
        assert_eq!(format_priority(Priority::Medium), "Medium");
        assert_eq!(format_priority(Priority::High), "High");
    }

    #[test]
    fn age_thresholds() {
        let now = 1_700_000_000;
        assert_eq!(format_age(now - 30, now), "now");
        assert_eq!(format_age(now - 90, now), "1min ago");
        assert_eq!(format_age(now - 59 * 60, now), "59min ago");
        assert_eq!(format_age(now - 3 * 3600, now), "3h ago");
        assert_eq!(format_age(now - 2 * 86400, now), "2d ago");
        // A month back falls through to the absolute date.
        let old = format_age(now - 30 * 86400, now);
        assert!(old.contains('/'), "expected absolute date, got {old}");
        // Clock skew never produces a negative age.
        assert_eq!(format_age(now + 120, now), "now");
    }

    #[test]
    fn stats_pluralisation() {
        let mut store = Store::default();
        assert_eq!(format_stats(&store.tasks), ("0 tasks".into(), "0 completed".into()));

        store.create("Buy milk", Priority::High).unwrap();
        assert_eq!(format_stats(&store.tasks), ("1 task".into(), "0 completed".into()));

        let id = store.tasks[0].id;
        store.create("Call home", Priority::Low).unwrap();
        store.toggle(id);
        assert_eq!(format_stats(&store.tasks), ("2 tasks".into(), "1 completed".into()));
    }

    #[test]
    fn save_load_round_trip() {
        let path = temp_file("round_trip");
        let mut store = store_with(&["A", "B", "C"]);
        store.toggle(store.tasks[1].id);
        store.save(&path).unwrap();

        let loaded = Store::load(&path);
        assert_eq!(loaded.tasks, store.tasks);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_fails_open() {
        let missing = temp_file("missing");
        assert!(Store::load(&missing).tasks.is_empty());

        let malformed = temp_file("malformed");
        std::fs::write(&malformed, "not json").unwrap();
        assert!(Store::load(&malformed).tasks.is_empty());
        let _ = std::fs::remove_file(&malformed);
    }
}
