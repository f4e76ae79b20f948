//! # `work_planner`
//!
//! Personal project and task planning with a kanban board, stored in `SQLite`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod event_log;
pub mod messages;
pub mod paths;
pub mod planner;
pub mod templates;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
