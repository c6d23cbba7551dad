//! Shared test utilities for database unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rusqlite::Connection;

use crate::database::{DatabaseConfig, DeleteOnCorruption, LifecycleEvent, ReactiveDatabase, SchemaCallbacks};
use crate::error::Result;

/// Schema used by handle tests: a single `users` table at version 1.
pub const USERS_DDL: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)";

/// Callbacks that run fixed DDL on create and count lifecycle events.
pub struct FixedSchema {
    ddl: &'static str,
    events: Arc<AtomicUsize>,
}

impl FixedSchema {
    /// Creates callbacks running `ddl`, returning the event counter too.
    pub fn new(ddl: &'static str) -> (Self, Arc<AtomicUsize>) {
        let events = Arc::new(AtomicUsize::new(0));
        (
            Self {
                ddl,
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

impl SchemaCallbacks for FixedSchema {
    fn version(&self) -> u32 {
        1
    }

    fn on_lifecycle(&self, conn: &Connection, _event: LifecycleEvent) -> Result<()> {
        self.events.fetch_add(1, Ordering::SeqCst);
        conn.execute_batch(self.ddl)?;
        Ok(())
    }
}

/// Creates an in-memory handle with the `users` schema.
///
/// The returned counter tracks how many lifecycle events ran.
#[must_use]
pub fn create_test_database() -> (ReactiveDatabase, Arc<AtomicUsize>) {
    let (schema, events) = FixedSchema::new(USERS_DDL);
    let db = ReactiveDatabase::new(
        DatabaseConfig::in_memory(),
        None,
        Box::new(schema),
        Arc::new(DeleteOnCorruption),
    );
    (db, events)
}

/// Creates a file-backed handle with the `users` schema inside `dir`.
#[must_use]
pub fn create_file_database(dir: &Path) -> (ReactiveDatabase, Arc<AtomicUsize>) {
    let (schema, events) = FixedSchema::new(USERS_DDL);
    let db = ReactiveDatabase::new(
        DatabaseConfig::new(dir),
        Some(dir.join("test.db")),
        Box::new(schema),
        Arc::new(DeleteOnCorruption),
    );
    (db, events)
}

/// Counts rows in `users`.
///
/// # Panics
///
/// Panics if the query fails; acceptable in test code.
#[must_use]
pub fn user_count(db: &ReactiveDatabase) -> i64 {
    db.read(|conn| conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)))
        .unwrap()
}
