//! Database configuration and connection parameters.
//!
//! This module provides configuration types for the physical database,
//! including data directory resolution, journal mode and the schema
//! transaction policy used during lifecycle dispatch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TABULA_DATA_DIR";

/// SQLite journal mode applied when a file-backed database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Write-ahead logging; readers do not block the writer.
    #[default]
    Wal,
    /// Rollback journal deleted at the end of each transaction.
    Delete,
    /// Rollback journal truncated instead of deleted.
    Truncate,
    /// Rollback journal header zeroed instead of deleted.
    Persist,
}

impl JournalMode {
    /// Returns the value used in `PRAGMA journal_mode`.
    #[must_use]
    pub const fn as_pragma(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
        }
    }

    /// Parses a journal mode name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown modes.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula::database::JournalMode;
    ///
    /// assert_eq!(JournalMode::parse("wal").unwrap(), JournalMode::Wal);
    /// assert_eq!(JournalMode::parse("DELETE").unwrap(), JournalMode::Delete);
    /// assert!(JournalMode::parse("memory").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wal" => Ok(Self::Wal),
            "delete" => Ok(Self::Delete),
            "truncate" => Ok(Self::Truncate),
            "persist" => Ok(Self::Persist),
            _ => Err(Error::Validation {
                field: "journal_mode".into(),
                message: format!("unknown journal mode '{s}' (expected wal/delete/truncate/persist)"),
            }),
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_pragma().to_lowercase())
    }
}

/// Configuration for the physical database behind a coordinator.
///
/// The database file itself is `data_dir/<name>`, where the name comes from
/// the [`DatabaseIdentity`](crate::DatabaseIdentity). A configuration without
/// a data directory describes a private in-memory database.
///
/// # Examples
///
/// ```
/// use tabula::database::DatabaseConfig;
/// use std::time::Duration;
///
/// // Create a configuration with default settings
/// let config = DatabaseConfig::new("/tmp/tabula");
///
/// // Customize the configuration
/// let config = DatabaseConfig::new("/tmp/tabula")
///     .with_busy_timeout(Duration::from_millis(10000))
///     .with_foreign_keys(false);
/// assert!(!config.foreign_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Directory holding the database file; `None` for in-memory databases.
    pub data_dir: Option<PathBuf>,
    /// Busy timeout for database lock contention.
    pub busy_timeout: Duration,
    /// Whether to create the data directory if it doesn't exist.
    pub auto_create: bool,
    /// Journal mode for file-backed databases.
    pub journal_mode: JournalMode,
    /// Whether `PRAGMA foreign_keys` is switched on for the connection.
    pub foreign_keys: bool,
    /// Whether create/upgrade dispatch runs inside a single transaction.
    ///
    /// When enabled, a failing table module rolls back every statement
    /// issued during the dispatch, including the version bump. When
    /// disabled, hooks run in autocommit mode and a failure leaves the
    /// schema in whatever state the earlier hooks produced.
    pub atomic_schema_changes: bool,
    /// Whether statement logging starts enabled on the handle.
    pub log_statements: bool,
}

impl DatabaseConfig {
    /// Creates a configuration for a file-backed database in `data_dir`.
    ///
    /// Default settings:
    /// - `busy_timeout`: 5000ms
    /// - `auto_create`: true
    /// - `journal_mode`: WAL
    /// - `foreign_keys`: true
    /// - `atomic_schema_changes`: true
    /// - `log_statements`: false
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula::database::DatabaseConfig;
    ///
    /// let config = DatabaseConfig::new("/tmp/tabula");
    /// assert_eq!(config.data_dir.unwrap().to_str().unwrap(), "/tmp/tabula");
    /// ```
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..Self::in_memory()
        }
    }

    /// Creates a configuration for a private in-memory database.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula::database::DatabaseConfig;
    ///
    /// let config = DatabaseConfig::in_memory();
    /// assert!(config.database_path("app.db").is_none());
    /// ```
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            journal_mode: JournalMode::Wal,
            foreign_keys: true,
            atomic_schema_changes: true,
            log_statements: false,
        }
    }

    /// Sets the busy timeout duration.
    ///
    /// The busy timeout determines how long the connection will wait when
    /// encountering a locked database before returning an error.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether the data directory is created on first open.
    #[must_use]
    pub fn with_auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = auto_create;
        self
    }

    /// Sets the journal mode.
    #[must_use]
    pub fn with_journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    /// Sets whether foreign key constraints are enforced.
    #[must_use]
    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Sets whether create/upgrade dispatch is wrapped in one transaction.
    #[must_use]
    pub fn with_atomic_schema_changes(mut self, atomic: bool) -> Self {
        self.atomic_schema_changes = atomic;
        self
    }

    /// Sets whether statement logging starts enabled.
    #[must_use]
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Returns the path of the database file named `name`, or `None` for
    /// in-memory configurations.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula::database::DatabaseConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = DatabaseConfig::new("/var/lib/app");
    /// assert_eq!(
    ///     config.database_path("app.db"),
    ///     Some(PathBuf::from("/var/lib/app/app.db"))
    /// );
    /// ```
    #[must_use]
    pub fn database_path(&self, name: &str) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(name))
    }
}

/// Returns the default data directory for tabula.
///
/// The default directory is `~/.tabula`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| Error::Validation {
        field: "home_directory".into(),
        message: "Cannot determine home directory".into(),
    })?;
    Ok(home.join(".tabula"))
}

/// Resolves the data directory using the environment or defaults.
///
/// The resolution order is:
/// 1. `$TABULA_DATA_DIR` if set
/// 2. `~/.tabula` otherwise
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined and
/// `TABULA_DATA_DIR` is not set.
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(data_dir) = std::env::var(DATA_DIR_ENV) {
        Ok(PathBuf::from(data_dir))
    } else {
        default_data_dir()
    }
}
