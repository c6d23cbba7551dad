//! Physical database open.
//!
//! This module opens the `SQLite` connection with the configured PRAGMA
//! settings, recovers from corrupt files through the error handler, and
//! runs the create/upgrade lifecycle exactly once per physical open.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};

use crate::error::{Error, Result};

use super::config::DatabaseConfig;
use super::error_handler::DatabaseErrorHandler;
use super::migrations::{get_schema_version, plan_lifecycle, set_schema_version, LifecycleEvent};

/// Callbacks the physical open drives.
///
/// The schema coordinator implements this to fan lifecycle events out to its
/// registered table modules.
pub(crate) trait SchemaCallbacks: Send + Sync {
    /// The configured schema version.
    fn version(&self) -> u32;

    /// Handles a lifecycle event on the connection being opened.
    fn on_lifecycle(&self, conn: &Connection, event: LifecycleEvent) -> Result<()>;
}

/// Opens the database, applying PRAGMAs and running the lifecycle.
///
/// A corrupt file is reported to `error_handler` and the open is retried
/// once; a second corruption failure becomes [`Error::DatabaseCorruption`].
pub(crate) fn open_connection(
    config: &DatabaseConfig,
    path: Option<&Path>,
    callbacks: &dyn SchemaCallbacks,
    error_handler: &dyn DatabaseErrorHandler,
) -> Result<Connection> {
    let configured = callbacks.version();
    let mut conn = match connect(config, path, configured) {
        Err(e) if e.is_corruption() => {
            error_handler.on_corruption(path);
            connect(config, path, configured).map_err(|e| {
                if e.is_corruption() {
                    Error::DatabaseCorruption {
                        details: e.to_string(),
                    }
                } else {
                    e
                }
            })?
        }
        other => other?,
    };

    apply_lifecycle(&mut conn, config, callbacks)?;

    Ok(conn)
}

/// Opens the connection and configures it, without touching the schema.
///
/// A stored version newer than `configured` is rejected before any PRAGMA
/// that rewrites the file header runs.
fn connect(config: &DatabaseConfig, path: Option<&Path>, configured: u32) -> Result<Connection> {
    let conn = match path {
        Some(path) => {
            if config.auto_create {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
            }

            // The handle serializes access itself
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            Connection::open_with_flags(path, flags)?
        }
        None => Connection::open_in_memory()?,
    };

    conn.busy_timeout(config.busy_timeout)?;

    // Reading the header also surfaces foreign files before any dispatch starts
    plan_lifecycle(get_schema_version(&conn)?, configured)?;

    if path.is_some() {
        // PRAGMA journal_mode returns a row, so it goes through query_row
        let _: String = conn.query_row(
            &format!("PRAGMA journal_mode = {}", config.journal_mode.as_pragma()),
            [],
            |row| row.get(0),
        )?;
    }

    conn.execute_batch(if config.foreign_keys {
        "PRAGMA foreign_keys = ON"
    } else {
        "PRAGMA foreign_keys = OFF"
    })?;

    Ok(conn)
}

/// Dispatches create/upgrade when the stored version differs.
fn apply_lifecycle(
    conn: &mut Connection,
    config: &DatabaseConfig,
    callbacks: &dyn SchemaCallbacks,
) -> Result<()> {
    let configured = callbacks.version();
    if plan_lifecycle(get_schema_version(conn)?, configured)?.is_none() {
        return Ok(());
    }

    if config.atomic_schema_changes {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Another process may have finished the lifecycle while we waited
        if let Some(event) = plan_lifecycle(get_schema_version(&tx)?, configured)? {
            run_event(&tx, callbacks, event)?;
        }

        tx.commit()?;
    } else if let Some(event) = plan_lifecycle(get_schema_version(conn)?, configured)? {
        run_event(conn, callbacks, event)?;
    }

    Ok(())
}

fn run_event(conn: &Connection, callbacks: &dyn SchemaCallbacks, event: LifecycleEvent) -> Result<()> {
    log::info!("running schema {event}");
    callbacks.on_lifecycle(conn, event)?;
    set_schema_version(conn, event.target_version())
}
