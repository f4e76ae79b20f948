//! Path utilities for determining data storage locations.
//!
//! Planner data lives in `~/.work-planner/` unless the config points the
//! database somewhere else.

use std::path::{Path, PathBuf};

/// The base directory name for planner data.
const DATA_DIR_NAME: &str = ".work-planner";

/// The database filename.
pub const DATABASE_FILENAME: &str = "planner.sqlite3";

/// The event log filename, written next to the database.
pub const EVENTS_FILENAME: &str = "events.jsonl";

/// Get the base data directory.
///
/// Returns `~/.work-planner/` or `None` if the home directory cannot be
/// determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Get the default database path, `~/.work-planner/planner.sqlite3`.
#[must_use]
pub fn default_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DATABASE_FILENAME))
}

/// Get the event log path for a database: the same directory, `events.jsonl`.
#[must_use]
pub fn events_path_for(db_path: &Path) -> PathBuf {
    db_path.parent().map_or_else(|| PathBuf::from(EVENTS_FILENAME), |dir| dir.join(EVENTS_FILENAME))
}
