//! Handlers invoked when the database file turns out to be corrupt.
//!
//! Opening retries exactly once after the handler returns, so a handler that
//! removes the file turns a corrupt database into a fresh one.

use std::path::Path;

use super::files::delete_database_files;

/// Reacts to a corrupt or foreign database file detected during open.
pub trait DatabaseErrorHandler: Send + Sync {
    /// Called once per failed open. `path` is `None` for in-memory databases.
    fn on_corruption(&self, path: Option<&Path>);
}

/// Deletes the corrupt database so the retried open recreates it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteOnCorruption;

impl DatabaseErrorHandler for DeleteOnCorruption {
    fn on_corruption(&self, path: Option<&Path>) {
        let Some(path) = path else {
            log::error!("in-memory database reported corruption");
            return;
        };

        log::error!("database {} is corrupt, deleting it", path.display());
        if let Err(e) = delete_database_files(path) {
            log::error!("could not delete corrupt database {}: {e}", path.display());
        }
    }
}

/// Leaves the corrupt file in place; the retried open then fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOnCorruption;

impl DatabaseErrorHandler for KeepOnCorruption {
    fn on_corruption(&self, path: Option<&Path>) {
        match path {
            Some(path) => log::warn!("database {} is corrupt, leaving it in place", path.display()),
            None => log::warn!("in-memory database reported corruption"),
        }
    }
}
