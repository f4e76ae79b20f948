//! Error types for `work_planner`.

use crate::planner::board::BoardError;
use crate::planner::validation::ValidationErrors;

/// Errors that can occur while planning work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),

    /// One or more fields failed validation. No storage call was made.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity ("project", "task", ...).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A board move could not be planned.
    #[error("{0}")]
    Board(#[from] BoardError),

    /// The storage backend refused the operation.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Build a not-found error for the given entity kind.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
