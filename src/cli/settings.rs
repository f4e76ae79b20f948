//! Settings CLI subcommands.

use clap::Subcommand;

/// Settings commands.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current settings.
    Show,

    /// Change settings. Only specified fields are updated.
    Set {
        /// Theme: light, dark, system
        #[arg(long)]
        theme: Option<String>,

        /// Default view: board, calendar, list
        #[arg(long)]
        default_view: Option<String>,

        /// Board columns in order, comma separated (e.g. todo,in-progress,done)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Enable or disable notifications
        #[arg(long)]
        notifications: Option<bool>,

        /// Enable or disable auto-save
        #[arg(long)]
        auto_save: Option<bool>,
    },
}
