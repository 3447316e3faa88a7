//! Command line definitions.

use clap::{Parser, Subcommand};
use myboard_core::{TaskPriority, TaskStatus};
use std::path::PathBuf;

/// MyBoard - personal task board with calendar and vault
#[derive(Debug, Parser)]
#[command(name = "myboard", version, about = "Personal task board with calendar and vault")]
pub struct Cli {
    /// SQLite database holding the board state
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long = "log-dir", global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        desc: String,

        /// Due date, YYYY-MM-DD
        #[arg(long, default_value = "")]
        due: String,

        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: TaskPriority,
    },

    /// Overwrite the editable fields of a task; status is kept
    Edit {
        id: i64,

        title: String,

        #[arg(short, long, default_value = "")]
        desc: String,

        #[arg(long, default_value = "")]
        due: String,

        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: TaskPriority,
    },

    /// Drop a task onto a status column
    Move {
        id: i64,

        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },

    /// Print the three status columns
    Board,

    /// Print one month of the calendar
    Calendar {
        /// Month to show, YYYY-MM; defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Create a task on this day instead of printing, YYYY-MM-DD
        #[arg(long, value_name = "DATE", requires = "title")]
        add_on: Option<String>,

        /// Title for --add-on
        #[arg(long)]
        title: Option<String>,
    },

    /// Manage stored credentials
    Vault {
        #[command(subcommand)]
        command: VaultCommand,
    },

    /// Write a backup file of tasks, vault and budget state
    Export {
        /// Target directory; the file name is derived from the export time
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Restore from a backup file
    Import { file: PathBuf },

    /// Switch between light and dark
    Theme,
}

#[derive(Debug, Subcommand)]
pub enum VaultCommand {
    Add {
        site: String,
        username: String,
        password: String,
    },
    Delete {
        id: i64,
    },
    List,
}

fn parse_priority(value: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(value).ok_or_else(|| format!("unknown priority `{value}` (low, medium, high)"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value)
        .ok_or_else(|| format!("unknown status `{value}` (todo, inprogress, done)"))
}
