//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers
//! - Database fixtures written directly with rusqlite

use assert_cmd::Command;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabula::database::DatabaseConfig;
use tabula::{DatabaseIdentity, HookResult, SchemaCoordinator, TableModule};
use tempfile::TempDir;

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the tabula data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory is created empty.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("tabula-data");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self { temp_dir, data_dir }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// `TABULA_*` variables are cleared so the host environment cannot leak
    /// into the test.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("tabula").expect("Failed to find tabula binary");
        for key in [
            "TABULA_DATA_DIR",
            "TABULA_BUSY_TIMEOUT",
            "TABULA_BUSY_TIMEOUT_MS",
            "TABULA_JOURNAL_MODE",
            "TABULA_FOREIGN_KEYS",
            "TABULA_ATOMIC_SCHEMA_CHANGES",
            "TABULA_LOG_STATEMENTS",
            "TABULA_LOG_MODE",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Path of database `name` inside the data directory.
    pub fn db_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Create database `name` at `version` with the given tables.
    pub fn create_database(&self, name: &str, version: u32, tables: &[&str]) -> PathBuf {
        let path = self.db_path(name);
        create_database_at(&path, version, tables);
        path
    }

    /// Create database `name` through a schema coordinator with its
    /// default (WAL) configuration, then close it.
    pub fn create_managed_database(&self, name: &str, version: u32) -> PathBuf {
        let coordinator = SchemaCoordinator::new(
            DatabaseIdentity::new(name, version).expect("Invalid identity"),
            DatabaseConfig::new(&self.data_dir),
            vec![Arc::new(UsersTable) as Arc<dyn TableModule>],
        )
        .expect("Failed to build coordinator");
        coordinator.database().expect("Failed to open database");
        coordinator.close().expect("Failed to close database");
        self.db_path(name)
    }

    /// Journal and WAL files currently next to database `name`.
    pub fn companion_files(&self, name: &str) -> Vec<PathBuf> {
        ["-wal", "-shm", "-journal"]
            .iter()
            .map(|suffix| self.data_dir.join(format!("{name}{suffix}")))
            .filter(|path| path.exists())
            .collect()
    }
}

/// Single `users` table module for coordinator-built fixtures.
struct UsersTable;

impl TableModule for UsersTable {
    fn name(&self) -> &'static str {
        "users"
    }

    fn create_tables(&self, conn: &rusqlite::Connection) -> HookResult {
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY)")?;
        Ok(())
    }

    fn on_upgrade(&self, _conn: &rusqlite::Connection, _old: u32, _new: u32) -> HookResult {
        Ok(())
    }
}

/// Create a database file at `path` with `user_version` and empty tables.
pub fn create_database_at(path: &Path, version: u32, tables: &[&str]) {
    let conn = Connection::open(path).expect("Failed to create database");
    for table in tables {
        conn.execute_batch(&format!("CREATE TABLE {table} (id INTEGER PRIMARY KEY)"))
            .expect("Failed to create table");
    }
    conn.execute_batch(&format!("PRAGMA user_version = {version}"))
        .expect("Failed to set version");
}
