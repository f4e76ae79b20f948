//! Command-line interface for work-planner.
//!
//! Two-level commands for projects, tasks, tags, the board and settings,
//! plus a few single-level views (dashboard, calendar, audit log).

mod board;
mod project;
mod run;
mod settings;
mod tag;
mod task;


pub use board::BoardCommand;
pub use project::ProjectCommand;
pub use run::{run, run_in, CliOutput};
pub use settings::SettingsCommand;
pub use tag::TagCommand;
pub use task::TaskCommand;

use clap::{Parser, Subcommand};

/// Personal project and task planner.
///
/// For detailed help on any command group, use:
///   work-planner <command> --help
#[derive(Parser, Debug)]
#[command(name = "work-planner")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Project management - create, update, archive and delete projects.
    ///
    /// Deleting a project also deletes every task in it. Archived projects
    /// are hidden from `project list` but keep their tasks.
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Task management - create, update, move and delete tasks.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Tag management.
    #[command(subcommand)]
    Tag(TagCommand),

    /// Show the kanban board or repair its positions.
    #[command(subcommand)]
    Board(BoardCommand),

    /// Show or change application settings.
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Summary of task counts, overdue and recent tasks, and project progress.
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Due dates and creation dates of tasks, in date order.
    Calendar {
        /// Start of the range (inclusive): YYYY-MM-DD or RFC 3339
        #[arg(long)]
        from: Option<String>,

        /// End of the range (exclusive): YYYY-MM-DD or RFC 3339
        #[arg(long)]
        to: Option<String>,

        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Get the audit log of store writes.
    #[command(name = "audit-log")]
    AuditLog {
        /// Filter by entity ID
        #[arg(long)]
        id: Option<String>,

        /// Maximum number of entries to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show version information.
    Version,

    /// Ensure the config file exists (create with defaults if not).
    #[command(name = "ensure-config")]
    EnsureConfig,
}
