use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed task list CLI.
/// Storage defaults to ~/.tasklist/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tsk", version, about = "Local task list manager")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
