//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the subcommands: the
//! store mutations, the list/stats presenters and the TUI launcher. Every
//! mutating command saves the full store before returning.

use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::fields::{FilterMode, Priority};
use crate::store::{filter_tasks, format_age, format_priority, format_stats, Store};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// Add a new task.
    Add {
        /// Task text.
        text: String,
        /// Priority tag: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },

    /// List tasks in their manual order.
    List {
        /// View: all | completed | pending.
        #[arg(long, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
    },

    /// Toggle a task's completion state.
    Toggle {
        /// Task id.
        id: u64,
    },

    /// Delete a task.
    Delete {
        /// Task id.
        id: u64,
    },

    /// Move a task next to another task.
    Move {
        /// Id of the task to move.
        from: u64,
        /// Id of the task to land next to.
        to: u64,
    },

    /// Remove all tasks.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Show task counts.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

fn save_or_exit(store: &Store, db_path: &Path) {
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
pub fn cmd_add(store: &mut Store, db_path: &Path, text: String, priority: Priority) {
    let id = match store.create(&text, priority) {
        Ok(task) => task.id,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    save_or_exit(store, db_path);
    println!("Added task {id}");
}

/// List tasks under the given filter, in their manual order.
pub fn cmd_list(store: &Store, filter: FilterMode) {
    let visible = filter_tasks(&store.tasks, filter);
    if visible.is_empty() {
        println!("No tasks found.");
    } else {
        let now = Utc::now().timestamp();
        println!("{:<4}{:<15} {:<8} {:<11} {}", "", "ID", "Pri", "Age", "Text");
        for t in &visible {
            let mark = if t.completed { "[x]" } else { "[ ]" };
            println!(
                "{:<4}{:<15} {:<8} {:<11} {}",
                mark,
                t.id,
                format_priority(t.priority),
                format_age(t.created_at_utc, now),
                t.text
            );
        }
    }
    let (total, completed) = format_stats(&store.tasks);
    println!("{total} | {completed}");
}

/// Toggle completion on a task. Unknown ids leave the store unchanged.
pub fn cmd_toggle(store: &mut Store, db_path: &Path, id: u64) {
    if store.toggle(id) {
        save_or_exit(store, db_path);
        let done = store.get(id).is_some_and(|t| t.completed);
        println!("Task {} {}", id, if done { "completed" } else { "reopened" });
    } else {
        println!("No task with id {id}.");
    }
}

/// Delete a task. Unknown ids leave the store unchanged.
pub fn cmd_delete(store: &mut Store, db_path: &Path, id: u64) {
    if store.delete(id) {
        save_or_exit(store, db_path);
        println!("Deleted task {id}");
    } else {
        println!("No task with id {id}.");
    }
}

/// Move a task next to another task.
pub fn cmd_move(store: &mut Store, db_path: &Path, from: u64, to: u64) {
    if store.reorder(from, to) {
        save_or_exit(store, db_path);
        println!("Moved task {from}");
    } else {
        println!("Nothing to move.");
    }
}

/// Remove all tasks after confirmation.
pub fn cmd_clear(store: &mut Store, db_path: &Path, yes: bool) {
    if store.tasks.is_empty() {
        println!("No tasks to clear.");
        return;
    }
    if !yes {
        let (total, _) = format_stats(&store.tasks);
        print!("Really clear {total}? (y/N): ");
        let _ = io::stdout().flush();
        let mut response = String::new();
        if io::stdin().read_line(&mut response).is_err()
            || !response.trim().eq_ignore_ascii_case("y")
        {
            println!("Cancelled.");
            return;
        }
    }
    store.clear();
    save_or_exit(store, db_path);
    println!("Cleared.");
}

/// Print task counts.
pub fn cmd_stats(store: &Store) {
    let (total, completed) = format_stats(&store.tasks);
    println!("{total}");
    println!("{completed}");
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
