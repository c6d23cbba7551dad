//! Schema version bookkeeping and lifecycle planning.
//!
//! The stored schema version lives in SQLite's `PRAGMA user_version`
//! header field. A value of zero means the schema has never been created.

use std::fmt;

use rusqlite::Connection;

use crate::error::{Error, Result};

/// A lifecycle event produced by a physical open.
///
/// Exactly one event (or none, when the versions match) is produced per
/// open and handed to every registered table module before the open returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The database is new; every module creates its tables.
    Create {
        /// Version the schema is created at.
        version: u32,
    },
    /// The database exists at an older version; every module migrates.
    Upgrade {
        /// Version stored in the file.
        old_version: u32,
        /// Version the coordinator was configured with.
        new_version: u32,
    },
}

impl LifecycleEvent {
    /// Returns the version the schema ends up at after this event.
    #[must_use]
    pub const fn target_version(&self) -> u32 {
        match *self {
            Self::Create { version } => version,
            Self::Upgrade { new_version, .. } => new_version,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { version } => write!(f, "create (v{version})"),
            Self::Upgrade {
                old_version,
                new_version,
            } => write!(f, "upgrade (v{old_version} -> v{new_version})"),
        }
    }
}

/// Decides which lifecycle event an open must dispatch.
///
/// # Errors
///
/// Returns [`Error::Downgrade`] if the stored version is newer than the
/// configured one.
///
/// # Examples
///
/// ```
/// use tabula::database::migrations::{plan_lifecycle, LifecycleEvent};
///
/// assert_eq!(
///     plan_lifecycle(0, 2).unwrap(),
///     Some(LifecycleEvent::Create { version: 2 })
/// );
/// assert_eq!(plan_lifecycle(2, 2).unwrap(), None);
/// assert!(plan_lifecycle(3, 2).is_err());
/// ```
pub fn plan_lifecycle(stored: u32, configured: u32) -> Result<Option<LifecycleEvent>> {
    if stored == 0 {
        Ok(Some(LifecycleEvent::Create {
            version: configured,
        }))
    } else if stored < configured {
        Ok(Some(LifecycleEvent::Upgrade {
            old_version: stored,
            new_version: configured,
        }))
    } else if stored > configured {
        Err(Error::Downgrade { stored, configured })
    } else {
        Ok(None)
    }
}

/// Gets the stored schema version from the database.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read, including when the file
/// is not a database at all.
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    u32::try_from(version).map_err(|_| Error::Validation {
        field: "user_version".into(),
        message: format!("stored schema version {version} is out of range"),
    })
}

/// Writes the stored schema version.
///
/// # Errors
///
/// Returns an error if the pragma cannot be written.
pub fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {version}"))?;
    Ok(())
}
