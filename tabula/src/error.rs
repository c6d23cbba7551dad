//! Error types for the tabula library.
//!
//! This module provides the error hierarchy for schema coordination,
//! lifecycle dispatch and reactive database access, using `thiserror`
//! for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with a tabula error.
///
/// # Examples
///
/// ```
/// use tabula::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(1)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a table module hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the tabula library.
#[derive(Debug, Error)]
pub enum Error {
    /// The same table module instance was registered twice.
    #[error("table module '{module}' registered twice (second occurrence at position {position})")]
    DuplicateModule {
        /// Name of the duplicated module.
        module: &'static str,
        /// Zero-based position of the second occurrence.
        position: usize,
    },

    /// A table module failed while creating its tables.
    #[error("table module '{module}' failed to create its tables: {source}")]
    CreateFailure {
        /// Name of the failing module.
        module: &'static str,
        /// The error returned by the module.
        #[source]
        source: HookError,
    },

    /// A table module failed while upgrading its tables.
    #[error("table module '{module}' failed to upgrade from version {old_version} to {new_version}: {source}")]
    UpgradeFailure {
        /// Name of the failing module.
        module: &'static str,
        /// Version stored in the database file.
        old_version: u32,
        /// Version the coordinator was configured with.
        new_version: u32,
        /// The error returned by the module.
        #[source]
        source: HookError,
    },

    /// The stored schema version is newer than the configured one.
    #[error("cannot downgrade database from version {stored} to {configured}")]
    Downgrade {
        /// Version stored in the database file.
        stored: u32,
        /// Version the coordinator was configured with.
        configured: u32,
    },

    /// The database handle was used after it was closed.
    #[error("database handle used after close")]
    UseAfterClose,

    /// The database handle was used from inside one of its own callbacks.
    #[error("database handle re-entered from a lifecycle hook or transaction on the same thread")]
    ReentrantAccess,

    /// Database corruption was detected and could not be recovered.
    #[error("database corruption detected: {details}")]
    DatabaseCorruption {
        /// Details about the corruption.
        details: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error reports a corrupt or foreign database file.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula::Error;
    ///
    /// assert!(!Error::UseAfterClose.is_corruption());
    /// ```
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::DatabaseCorruption { .. } => true,
            Self::Database(e) => matches!(
                e.sqlite_error_code(),
                Some(rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase)
            ),
            _ => false,
        }
    }

    /// Returns the name of the table module responsible for this error, if any.
    #[must_use]
    pub fn module(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateModule { module, .. }
            | Self::CreateFailure { module, .. }
            | Self::UpgradeFailure { module, .. } => Some(*module),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Downgrade {
            stored: 3,
            configured: 2,
        };
        assert_eq!(
            err.to_string(),
            "cannot downgrade database from version 3 to 2"
        );

        let err = Error::DuplicateModule {
            module: "users",
            position: 2,
        };
        assert!(err.to_string().contains("'users' registered twice"));
    }

    #[test]
    fn test_hook_failure_keeps_source() {
        use std::error::Error as _;

        let err = Error::UpgradeFailure {
            module: "posts",
            old_version: 1,
            new_version: 4,
            source: "column already exists".into(),
        };
        assert!(err.to_string().contains("from version 1 to 4"));
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("column already exists")
        );
        assert_eq!(err.module(), Some("posts"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_corruption_detection() {
        let err = Error::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_NOTADB),
            None,
        ));
        assert!(err.is_corruption());

        let err = Error::Database(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_corruption());
        assert!(!Error::UseAfterClose.is_corruption());
    }
}
