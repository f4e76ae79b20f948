//! Configuration management for work-planner.
//!
//! This module handles the `.work-planner/config.yaml` file, which picks the
//! database location, the message language, an optional directory of
//! template overrides and whether events are logged.

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file path relative to the base directory.
pub const CONFIG_FILE_PATH: &str = ".work-planner/config.yaml";

/// Language for user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// German.
    De,
}

impl Locale {
    /// Parse a locale from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a supported locale.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> std::result::Result<Self, InvalidLocale> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "de" | "german" | "deutsch" => Ok(Self::De),
            _ => Err(InvalidLocale(s.to_string())),
        }
    }

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing an invalid locale.
#[derive(Debug, Clone)]
pub struct InvalidLocale(pub String);

impl fmt::Display for InvalidLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid locale: '{}'. Valid values: en, de", self.0)
    }
}

impl std::error::Error for InvalidLocale {}

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Database file. Relative paths resolve against the base directory.
    /// None means `~/.work-planner/planner.sqlite3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Language for collection error messages.
    #[serde(default)]
    pub locale: Locale,

    /// Append every collection mutation to `events.jsonl`.
    #[serde(default)]
    pub debug_logging: bool,

    /// Directory of `.tera` files that replace the built-in templates of the
    /// same name. Relative paths resolve against the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

impl PlannerConfig {
    /// Load config from a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }

    /// Resolve the template override directory, if one is configured.
    #[must_use]
    pub fn templates_dir_in(&self, base_dir: &Path) -> Option<PathBuf> {
        self.templates_dir.as_ref().map(|dir| base_dir.join(dir))
    }

    /// Resolve the database file this config points at.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory is unknown.
    pub fn database_path_in(&self, base_dir: &Path) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(base_dir.join(path)),
            None => paths::default_db_path().ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "cannot determine home directory for the planner database",
                ))
            }),
        }
    }
}

/// Ensure config exists in a specific directory, writing defaults if not.
///
/// Returns the config (either loaded or newly created).
///
/// # Errors
///
/// Returns an error if config cannot be loaded or saved.
pub fn ensure_config_in(base_dir: &Path) -> Result<PlannerConfig> {
    if let Some(config) = PlannerConfig::load_from(base_dir)? {
        return Ok(config);
    }

    let config = PlannerConfig::default();
    config.save_to(base_dir)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PlannerConfig::load_from(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = PlannerConfig {
            database_path: Some(PathBuf::from("data/plans.sqlite3")),
            locale: Locale::De,
            debug_logging: true,
            templates_dir: Some(PathBuf::from("my-templates")),
        };
        config.save_to(dir.path()).unwrap();

        let loaded = PlannerConfig::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = PlannerConfig::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "locale: de\n").unwrap();

        let loaded = PlannerConfig::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.locale, Locale::De);
        assert!(!loaded.debug_logging);
        assert_eq!(loaded.database_path, None);
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = PlannerConfig::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "locale: [unclosed").unwrap();

        assert!(matches!(PlannerConfig::load_from(dir.path()), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_ensure_config_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let created = ensure_config_in(dir.path()).unwrap();
        assert_eq!(created, PlannerConfig::default());
        assert!(PlannerConfig::config_path(dir.path()).exists());

        PlannerConfig { debug_logging: true, ..Default::default() }.save_to(dir.path()).unwrap();
        assert!(ensure_config_in(dir.path()).unwrap().debug_logging);
    }

    #[test]
    fn test_database_path_resolution() {
        let base = Path::new("/work/home");
        let relative = PlannerConfig {
            database_path: Some(PathBuf::from("plans.sqlite3")),
            ..Default::default()
        };
        assert_eq!(relative.database_path_in(base).unwrap(), base.join("plans.sqlite3"));

        let absolute = PlannerConfig {
            database_path: Some(PathBuf::from("/var/db/plans.sqlite3")),
            ..Default::default()
        };
        assert_eq!(
            absolute.database_path_in(base).unwrap(),
            PathBuf::from("/var/db/plans.sqlite3")
        );
    }

    #[test]
    fn test_templates_dir_resolution() {
        let base = Path::new("/work/home");
        assert_eq!(PlannerConfig::default().templates_dir_in(base), None);

        let config = PlannerConfig {
            templates_dir: Some(PathBuf::from("views")),
            ..Default::default()
        };
        assert_eq!(config.templates_dir_in(base), Some(base.join("views")));
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!(Locale::from_str("DE").unwrap(), Locale::De);
        assert_eq!(Locale::from_str("english").unwrap(), Locale::En);
        let err = Locale::from_str("fr").unwrap_err();
        assert_eq!(err.to_string(), "Invalid locale: 'fr'. Valid values: en, de");
    }
}
