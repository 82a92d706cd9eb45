//! Process configuration for the suggestion store.
//!
//! Values come from the environment:
//! - `SUGGESTION_DB_PATH`: SQLite file; defaults to `suggestions.sqlite3`
//!   in the OS temp directory when unset or blank.
//! - `SUGGESTION_LOG_LEVEL`: `trace|debug|info|warn|error`; defaults to
//!   the build-mode level.
//! - `SUGGESTION_LOG_DIR`: absolute directory for rolling log files; logs
//!   go to stderr when unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SUGGESTION_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "SUGGESTION_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SUGGESTION_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "suggestions.sqlite3";

/// Resolved store and logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Replaces the database path.
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// Replaces the log level.
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(lookup_from(&[]));

        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("suggestions.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed_and_used() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /var/lib/suggestions/db.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/suggestions"),
        ]));

        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/suggestions/db.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/suggestions")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   "), (LOG_DIR_ENV, "")]));

        assert!(config.db_path.ends_with("suggestions.sqlite3"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_replace_resolved_values() {
        let config = StoreConfig::from_lookup(lookup_from(&[]))
            .with_db_path("/tmp/override.sqlite3")
            .with_log_level("error");

        assert_eq!(config.db_path, PathBuf::from("/tmp/override.sqlite3"));
        assert_eq!(config.log_level, "error");
    }
}
