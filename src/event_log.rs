//! Debug event logging.
//!
//! When `debug_logging` is enabled in the config, every collection mutation
//! and failure is appended as a JSONL line to `events.jsonl` next to the
//! database. Errors are silently ignored; logging never fails an operation.

use crate::config::PlannerConfig;
use crate::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where events go, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// A log that drops every event.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { path: None }
    }

    /// A log that appends to `path`.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// The log for a database, enabled only if the config asks for it.
    #[must_use]
    pub fn for_database(config: &PlannerConfig, db_path: &Path) -> Self {
        if config.debug_logging {
            Self::to_file(paths::events_path_for(db_path))
        } else {
            Self::disabled()
        }
    }

    /// Whether events are written.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Append one event.
    pub fn record(&self, event: &str, entity: &str, id: Option<&str>, detail: &str) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "event": event,
            "entity": entity,
            "id": id,
            "detail": detail,
        });

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{entry}");
    }
}
