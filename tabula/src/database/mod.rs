//! Database layer: the reactive handle and everything under it.
//!
//! This module owns the physical `SQLite` connection, the create/upgrade
//! lifecycle driven by the stored `user_version`, write transactions with
//! change tracking, and the file-level helpers used by the CLI.
//!
//! # Examples
//!
//! ```no_run
//! use tabula::database::{inspect, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/var/lib/app");
//! let path = config.database_path("app.db").unwrap();
//! let info = inspect(&path).unwrap();
//! println!("{} is at version {}", info.path.display(), info.version);
//! ```

mod config;
mod connection;
mod error_handler;
mod files;
mod handle;
mod inspect;
pub mod migrations;
mod transaction;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{default_data_dir, resolve_data_dir, DatabaseConfig, JournalMode, DATA_DIR_ENV};
pub use error_handler::{DatabaseErrorHandler, DeleteOnCorruption, KeepOnCorruption};
pub use files::{database_files, delete_database_files};
pub use handle::ReactiveDatabase;
pub use inspect::{inspect, DatabaseInfo};
pub use migrations::{get_schema_version, LifecycleEvent};
pub use transaction::Transaction;

pub(crate) use connection::SchemaCallbacks;
