//! Project CLI subcommands.

use clap::Subcommand;

/// Project management commands.
///
/// ## Quick Start
///
/// ```bash
/// work-planner project create --name "Home renovation" --color "#10B981"
/// work-planner project list
/// work-planner project archive <id>
/// ```
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// Create a new project.
    Create {
        /// Project name (required)
        #[arg(short, long)]
        name: String,

        /// Description with more details
        #[arg(short, long)]
        description: Option<String>,

        /// Display color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,

        /// Icon name
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Get a project by ID, archived or not.
    Get {
        /// Project ID
        id: String,
    },

    /// Update a project's fields.
    ///
    /// Only specified fields are updated. Pass an empty string to clear the
    /// description or icon.
    Update {
        /// Project ID
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,

        /// New icon
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Archive a project, hiding it from the project list.
    Archive {
        /// Project ID
        id: String,
    },

    /// Delete a project and all of its tasks.
    Delete {
        /// Project ID
        id: String,
    },

    /// List projects, oldest first.
    List {
        /// List archived projects instead
        #[arg(long)]
        archived: bool,
    },
}
