//! Tag CLI subcommands.

use clap::Subcommand;

/// Tag management commands.
#[derive(Subcommand, Debug, Clone)]
pub enum TagCommand {
    /// Create a new tag.
    Create {
        /// Tag name (required)
        #[arg(short, long)]
        name: String,

        /// Display color as #RRGGBB
        #[arg(short, long, default_value = "#6B7280")]
        color: String,
    },

    /// Update a tag.
    Update {
        /// Tag ID
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a tag. Tasks keep the name in their tag lists.
    Delete {
        /// Tag ID
        id: String,
    },

    /// List tags by name.
    List,
}
