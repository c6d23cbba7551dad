//! Common test utilities for integration tests.
//!
//! This module provides table module fixtures and helpers shared by the
//! tabula integration tests.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use rusqlite::Connection;
use tabula::database::DatabaseConfig;
use tabula::{DatabaseIdentity, HookResult, ReactiveDatabase, SchemaCoordinator, TableModule};

/// Name of the database file used by the fixtures.
#[allow(dead_code)]
pub const DB_NAME: &str = "app.db";

/// One hook invocation, as seen by a [`RecordingModule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    /// `create_tables` ran.
    Create(&'static str),
    /// `on_upgrade` ran with the given versions.
    Upgrade(&'static str, u32, u32),
}

/// Shared, ordered log of hook invocations.
pub type CallLog = Arc<Mutex<Vec<HookCall>>>;

/// Returns the calls recorded so far.
#[allow(dead_code)]
pub fn calls(log: &CallLog) -> Vec<HookCall> {
    log.lock().unwrap().clone()
}

/// Owns a `users` table. Version 2 adds an `email` column.
#[derive(Default)]
pub struct UserModule {
    db: OnceLock<ReactiveDatabase>,
}

#[allow(dead_code)]
impl UserModule {
    /// Returns the handle passed to `bind_database`.
    pub fn bound(&self) -> Option<&ReactiveDatabase> {
        self.db.get()
    }
}

impl TableModule for UserModule {
    fn name(&self) -> &'static str {
        "users"
    }

    fn bind_database(&self, db: &ReactiveDatabase) {
        let _ = self.db.set(db.clone());
    }

    fn create_tables(&self, conn: &Connection) -> HookResult {
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
        Ok(())
    }

    fn on_upgrade(&self, conn: &Connection, old_version: u32, new_version: u32) -> HookResult {
        if old_version < 2 && new_version >= 2 {
            conn.execute_batch("ALTER TABLE users ADD COLUMN email TEXT")?;
        }
        Ok(())
    }
}

/// Owns a `posts` table referencing `users`.
#[derive(Default)]
pub struct PostModule;

impl TableModule for PostModule {
    fn name(&self) -> &'static str {
        "posts"
    }

    fn create_tables(&self, conn: &Connection) -> HookResult {
        conn.execute_batch(
            "CREATE TABLE posts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL
            )",
        )?;
        Ok(())
    }

    fn on_upgrade(&self, _conn: &Connection, _old_version: u32, _new_version: u32) -> HookResult {
        Ok(())
    }
}

/// Records every hook call into a shared log and optionally fails.
pub struct RecordingModule {
    name: &'static str,
    log: CallLog,
    ddl: Option<&'static str>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingModule {
    /// Creates a module that only records.
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            ddl: None,
            fail: false,
        }
    }

    /// Runs `ddl` on create.
    #[must_use]
    pub const fn with_ddl(mut self, ddl: &'static str) -> Self {
        self.ddl = Some(ddl);
        self
    }

    /// Fails every hook after recording it.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn finish(&self) -> HookResult {
        if self.fail {
            return Err(format!("{} refused", self.name).into());
        }
        Ok(())
    }
}

impl TableModule for RecordingModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn create_tables(&self, conn: &Connection) -> HookResult {
        self.log.lock().unwrap().push(HookCall::Create(self.name));
        if let Some(ddl) = self.ddl {
            conn.execute_batch(ddl)?;
        }
        self.finish()
    }

    fn on_upgrade(&self, _conn: &Connection, old_version: u32, new_version: u32) -> HookResult {
        self.log
            .lock()
            .unwrap()
            .push(HookCall::Upgrade(self.name, old_version, new_version));
        self.finish()
    }
}

/// Builds a coordinator over `users` and `posts` in `dir`.
#[allow(dead_code)]
pub fn users_and_posts(dir: &Path, version: u32) -> SchemaCoordinator {
    let modules: Vec<Arc<dyn TableModule>> =
        vec![Arc::new(UserModule::default()), Arc::new(PostModule)];
    SchemaCoordinator::new(
        DatabaseIdentity::new(DB_NAME, version).unwrap(),
        DatabaseConfig::new(dir),
        modules,
    )
    .unwrap()
}

/// Builds an in-memory coordinator over `users` and `posts`.
#[allow(dead_code)]
pub fn in_memory_users_and_posts() -> SchemaCoordinator {
    let modules: Vec<Arc<dyn TableModule>> =
        vec![Arc::new(UserModule::default()), Arc::new(PostModule)];
    SchemaCoordinator::new(
        DatabaseIdentity::new(DB_NAME, 1).unwrap(),
        DatabaseConfig::in_memory(),
        modules,
    )
    .unwrap()
}

/// Lists user tables directly from a file, bypassing tabula.
#[allow(dead_code)]
pub fn table_names(path: &Path) -> Vec<String> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<String>>>()
        .unwrap()
}

/// Reads `user_version` directly from a file, bypassing tabula.
#[allow(dead_code)]
pub fn stored_version(path: &Path) -> u32 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap()
}
