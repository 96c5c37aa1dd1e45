//! # tsk - Task List CLI
//!
//! A minimal local task list manager: short text tasks with a priority tag,
//! toggled, deleted, reordered and filtered, persisted across sessions in a
//! single JSON file.
//!
//! ## Key Features
//!
//! - **Manual Ordering**: new tasks land at the top; move any task next to
//!   any other, and the order survives restarts
//! - **Two Interfaces**: one-shot CLI subcommands for scripting + an
//!   interactive TUI for everyday use
//! - **Local File Storage**: a single JSON file, written through after
//!   every change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! tsk
//!
//! # Add a task via CLI
//! tsk add "Buy milk" --priority high
//!
//! # List pending tasks
//! tsk list --filter pending
//!
//! # Toggle / delete by id
//! tsk toggle 1754140800000
//! tsk delete 1754140800000
//! ```
//!
//! Data is stored in `~/.tasklist/tasks.json` unless `--db` points
//! elsewhere.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod fields;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use store::Store;

fn main() {
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".tasklist");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create task directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir.join("tasks.json")
    });

    let command = cli.command.unwrap_or(Commands::Ui);

    if let Commands::Ui = command {
        cmd_ui(&db_path);
        return;
    }

    let mut store = Store::load(&db_path);

    match command {
        Commands::Ui => unreachable!("UI command handled above"),
        Commands::Add { text, priority } => cmd_add(&mut store, &db_path, text, priority),
        Commands::List { filter } => cmd_list(&store, filter),
        Commands::Toggle { id } => cmd_toggle(&mut store, &db_path, id),
        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),
        Commands::Move { from, to } => cmd_move(&mut store, &db_path, from, to),
        Commands::Clear { yes } => cmd_clear(&mut store, &db_path, yes),
        Commands::Stats => cmd_stats(&store),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
