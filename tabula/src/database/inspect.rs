//! Read-only inspection of database files.
//!
//! Inspection never writes to the database and leaves no journal files
//! behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};

use super::migrations::get_schema_version;

/// A snapshot of a database file's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    /// Path of the main database file.
    pub path: PathBuf,
    /// Stored schema version (`0` if the schema was never created).
    pub version: u32,
    /// User tables, sorted by name.
    pub tables: Vec<String>,
    /// Size of the main file in bytes.
    pub size_bytes: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Reads a database file's version and table list without modifying it.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the file does not exist, or a database
/// error if it cannot be read.
///
/// # Examples
///
/// ```no_run
/// let info = tabula::database::inspect("/var/lib/app/app.db".as_ref()).unwrap();
/// println!("v{} with {} tables", info.version, info.tables.len());
/// ```
pub fn inspect(path: &Path) -> Result<DatabaseInfo> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound {
                resource: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    // Closing the last read-write connection removes -wal and -shm, which a
    // read-only one leaves behind. query_only rejects every write.
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.execute_batch("PRAGMA query_only = ON")?;

    let version = get_schema_version(&conn)?;
    let tables = list_tables(&conn)?;
    conn.close().map_err(|(_, e)| Error::Database(e))?;

    Ok(DatabaseInfo {
        path: path.to_path_buf(),
        version,
        tables,
        size_bytes: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(tables)
}
