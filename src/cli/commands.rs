use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::CompletionPolicy;
use crate::models::Priority;

const VERSION: &str = env!("TASKFOCUS_VERSION");

#[derive(Parser)]
#[command(
    name = "taskfocus",
    version = VERSION,
    about = "Personal task list with an ordered backlog and a Focus Mode batch",
    after_help = "\
NOTE:
  Data lives in the nearest .taskfocus/ directory above the current one,
  or in $TASKFOCUS_DIR if set. Run `taskfocus init` before any other command.
  Set TASKFOCUS_LOG (e.g. `debug`) for diagnostics on stderr.

EXIT CODES:
  0  Success
  1  Error (validation, unknown task, invalid reorder, storage, etc.)

ORDERING RULES:
  New tasks go to the end of the list.
  `defer` moves a task to the end; completing or deleting leaves gaps, never reshuffles.
  `reorder` renumbers 1..n: listed tasks first, unlisted ones after in their old order.
  A reorder naming any unknown or completed task is rejected with no changes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize taskfocus in this directory
    Init,

    /// Add a task to the end of the list
    Add {
        /// Task title
        title: String,
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List incomplete tasks in order
    List,

    /// List completed tasks, most recent first
    Completed,

    /// Show task details
    Show {
        /// Task ID or prefix
        id: String,
    },

    /// Edit title, priority, due date or notes
    Edit {
        /// Task ID or prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },

    /// Complete a task
    Done {
        id: String,
    },

    /// Move a task to the end of the list
    Defer {
        id: String,
    },

    /// Set the order of incomplete tasks
    #[command(after_help = "\
STDIN FORMAT (with --stdin):
  [{\"id\":\"01J...\", \"position\":1}, {\"id\":\"01K...\", \"position\":2}]
  Items are ranked by position; ids must be exact.")]
    Reorder {
        /// Task IDs or prefixes, first to last
        #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
        ids: Vec<String>,
        /// Read `{id, position}` items as JSON from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Delete a task
    Delete {
        id: String,
    },

    /// Show the current Focus Mode batch
    Focus {
        /// Override the configured batch size
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Change a setting
    #[command(subcommand)]
    Set(ConfigSetCommands),
}

#[derive(Subcommand)]
pub enum ConfigSetCommands {
    /// Number of tasks shown in Focus Mode
    BatchSize { size: usize },
    /// Completing an already completed task: idempotent | reject
    CompletionPolicy {
        #[arg(value_parser = parse_completion_policy)]
        policy: CompletionPolicy,
    },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s).ok_or_else(|| format!("invalid priority '{s}' (high, medium, low)"))
}

fn parse_completion_policy(s: &str) -> Result<CompletionPolicy, String> {
    CompletionPolicy::from_str(s).ok_or_else(|| format!("invalid policy '{s}' (idempotent, reject)"))
}
