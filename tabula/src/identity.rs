//! Database identity: the name and schema version a coordinator manages.

use std::fmt;

use crate::error::{Error, Result};

/// The name and configured schema version of a managed database.
///
/// The name doubles as the database file name inside the configured data
/// directory, so it must be a plain file name.
///
/// # Examples
///
/// ```
/// use tabula::DatabaseIdentity;
///
/// let identity = DatabaseIdentity::new("app.db", 3).unwrap();
/// assert_eq!(identity.name(), "app.db");
/// assert_eq!(identity.version(), 3);
///
/// assert!(DatabaseIdentity::new("app.db", 0).is_err());
/// assert!(DatabaseIdentity::new("../app.db", 1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseIdentity {
    name: String,
    version: u32,
}

impl DatabaseIdentity {
    /// Creates a validated identity.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the version is zero, or if the name is
    /// empty, contains a path separator, or is a relative path component.
    pub fn new(name: impl Into<String>, version: u32) -> Result<Self> {
        let name = name.into();

        if version == 0 {
            return Err(Error::Validation {
                field: "version".into(),
                message: "database version must be at least 1".into(),
            });
        }

        if name.trim().is_empty() {
            return Err(Error::Validation {
                field: "name".into(),
                message: "database name cannot be empty".into(),
            });
        }

        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Validation {
                field: "name".into(),
                message: format!("database name '{name}' must be a plain file name"),
            });
        }

        Ok(Self { name, version })
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured schema version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for DatabaseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.name, self.version)
    }
}
