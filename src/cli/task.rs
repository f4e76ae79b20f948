//! Task CLI subcommands.
//!
//! Provides commands for managing tasks: create, update, move on the board,
//! and list by project or status.

use clap::Subcommand;

/// Task management commands.
///
/// Each task belongs to one project and sits in one board column (its
/// status). New tasks go to the end of their column.
///
/// ## Quick Start
///
/// ```bash
/// # Create a task
/// work-planner task create --project <project-id> --title "Buy paint" --priority high
///
/// # Move it to another column
/// work-planner task move <id> --status in-progress
///
/// # Reorder within a column
/// work-planner task move <id> --status in-progress --index 0
/// ```
///
/// ## Statuses
///
/// todo, in-progress, review, done
///
/// ## Priorities
///
/// low, medium (default), high, urgent
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Create a new task at the end of its column.
    Create {
        /// Owning project ID (required)
        #[arg(short, long)]
        project: String,

        /// Title for the task (required)
        #[arg(short, long)]
        title: String,

        /// Description with more details
        #[arg(short, long)]
        description: Option<String>,

        /// Status: todo, in-progress, review, done
        #[arg(short, long, default_value = "todo")]
        status: String,

        /// Priority: low, medium, high, urgent
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Due date: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,

        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Assignee
        #[arg(long)]
        assignee: Option<String>,

        /// Explicit position instead of the end of the column
        #[arg(long)]
        position: Option<u32>,
    },

    /// Get a task by ID.
    Get {
        /// Task ID
        id: String,
    },

    /// Update a task's fields.
    ///
    /// Only specified fields are updated. Setting the status to done records
    /// the completion time if the task has none.
    Update {
        /// Task ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,

        /// New status: todo, in-progress, review, done
        #[arg(short, long)]
        status: Option<String>,

        /// New priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// New due date: YYYY-MM-DD or RFC 3339
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Replace the tag list (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,

        /// New assignee (empty string clears it)
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Move a task on its project's board.
    ///
    /// Moving to another status appends to that column. Moving within the
    /// same status places the task at --index and renumbers the column.
    Move {
        /// Task ID
        id: String,

        /// Target status
        #[arg(short, long)]
        status: String,

        /// Target index within the column (same-status moves only)
        #[arg(short, long, default_value = "0")]
        index: usize,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// List tasks in position order.
    List {
        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<String>,

        /// Only tasks with this status
        #[arg(short, long)]
        status: Option<String>,
    },

    /// List tasks past their due date that are not done.
    Overdue {
        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<String>,
    },
}
