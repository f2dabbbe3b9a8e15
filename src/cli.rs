//! CLI argument parsing for todos.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todos::{Backend, Filter, TaskId};

#[derive(Parser)]
#[command(
    name = "td",
    about = "A small to-do list for the terminal",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/todos/logs/todos.log"
)]
pub struct Cli {
    /// Path to the store directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Storage backend (sqlite, file); overrides the config file
    #[arg(short = 'b', long, global = true)]
    pub backend: Option<Backend>,

    /// Keep tasks in memory only; nothing is read from or written to disk
    #[arg(short = 'e', long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new store in the current directory
    Init,

    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a task done, or not done again
    Toggle {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Remove all completed tasks
    Clear,

    /// List tasks
    List {
        /// Which tasks to show (all, active, completed)
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Interactive session
    Shell,

    /// Show a live clock
    Clock {
        /// Print the time once and exit
        #[arg(long)]
        once: bool,
    },
}
