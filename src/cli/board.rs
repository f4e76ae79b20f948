//! Board CLI subcommands.

use clap::Subcommand;

/// Kanban board commands.
///
/// Columns follow the `board_columns` setting. Positions are per project, so
/// moving and repairing work within one project's board.
#[derive(Subcommand, Debug, Clone)]
pub enum BoardCommand {
    /// Show the board.
    Show {
        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Renumber every column of a project's board to 0, 1, 2, ...
    Repair {
        /// Project ID
        #[arg(short, long)]
        project: String,
    },
}
