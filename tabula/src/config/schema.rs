//! Configuration schema definitions.
//!
//! Every field is optional so that partial files and environment overrides
//! can be layered; unset fields fall back to the [`DatabaseConfig`] defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::database::{resolve_data_dir, DatabaseConfig, JournalMode};
use crate::error::Result;

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use tabula::config::Config;
/// use tabula::database::JournalMode;
///
/// let config: Config = serde_yaml::from_str("journal_mode: delete\nforeign_keys: false\n").unwrap();
/// assert_eq!(config.journal_mode, Some(JournalMode::Delete));
/// assert_eq!(config.foreign_keys, Some(false));
/// assert!(config.data_dir.is_none());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding database files.
    pub data_dir: Option<PathBuf>,

    /// Busy timeout for lock contention (milliseconds).
    pub busy_timeout_ms: Option<u64>,

    /// Journal mode for file-backed databases.
    pub journal_mode: Option<JournalMode>,

    /// Enable `PRAGMA foreign_keys`.
    pub foreign_keys: Option<bool>,

    /// Run create/upgrade dispatch inside a single transaction.
    pub atomic_schema_changes: Option<bool>,

    /// Start with statement logging enabled.
    pub log_statements: Option<bool>,
}

impl Config {
    /// Converts this configuration into a [`DatabaseConfig`].
    ///
    /// Without an explicit `data_dir`, the directory is resolved from
    /// `TABULA_DATA_DIR` or the default `~/.tabula`.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is configured and the home
    /// directory cannot be determined.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use std::time::Duration;
    /// use tabula::config::Config;
    ///
    /// let config = Config {
    ///     data_dir: Some(PathBuf::from("/var/lib/app")),
    ///     busy_timeout_ms: Some(250),
    ///     ..Default::default()
    /// };
    /// let db = config.to_database_config().unwrap();
    /// assert_eq!(db.busy_timeout, Duration::from_millis(250));
    /// assert!(db.atomic_schema_changes);
    /// ```
    pub fn to_database_config(&self) -> Result<DatabaseConfig> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => resolve_data_dir()?,
        };

        let mut config = DatabaseConfig::new(data_dir);
        if let Some(ms) = self.busy_timeout_ms {
            config = config.with_busy_timeout(Duration::from_millis(ms));
        }
        if let Some(mode) = self.journal_mode {
            config = config.with_journal_mode(mode);
        }
        if let Some(enabled) = self.foreign_keys {
            config = config.with_foreign_keys(enabled);
        }
        if let Some(atomic) = self.atomic_schema_changes {
            config = config.with_atomic_schema_changes(atomic);
        }
        if let Some(enabled) = self.log_statements {
            config = config.with_statement_logging(enabled);
        }

        Ok(config)
    }
}
