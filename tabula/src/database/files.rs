//! Physical database file removal.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffixes of the files SQLite keeps next to a database.
const COMPANION_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Returns the database file followed by its journal, WAL and shared-memory
/// companions.
#[must_use]
pub fn database_files(path: &Path) -> Vec<PathBuf> {
    let mut files = vec![path.to_path_buf()];
    for suffix in COMPANION_SUFFIXES {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        files.push(PathBuf::from(name));
    }
    files
}

/// Deletes a database file and its companion files.
///
/// Missing files are ignored. Returns whether the main database file existed.
///
/// # Errors
///
/// Returns the first I/O error other than "not found".
///
/// # Examples
///
/// ```no_run
/// use tabula::database::delete_database_files;
/// use std::path::Path;
///
/// let existed = delete_database_files(Path::new("/tmp/tabula/app.db")).unwrap();
/// println!("deleted: {existed}");
/// ```
pub fn delete_database_files(path: &Path) -> io::Result<bool> {
    let mut existed = false;
    for (index, file) in database_files(path).iter().enumerate() {
        match fs::remove_file(file) {
            Ok(()) => {
                log::debug!("removed {}", file.display());
                existed |= index == 0;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(existed)
}
