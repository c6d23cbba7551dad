#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tabula
//!
//! Schema coordination for pluggable table modules sharing one `SQLite`
//! database, with a reactive query layer on top.
//!
//! Independent modules each own the DDL and migrations for their tables.
//! A [`SchemaCoordinator`] registers them in order, opens the database on
//! first use, and fans a single create or upgrade event out to every module.
//! Callers then read and write through the shared [`ReactiveDatabase`]
//! handle, whose queries re-emit whenever a committed write touches a table
//! they observe.
//!
//! ## Core Types
//!
//! - [`SchemaCoordinator`] and [`TableModule`]: schema ownership and lifecycle
//! - [`ReactiveDatabase`], [`QueryObservable`] and [`Subscription`]: reactive access
//! - [`DatabaseIdentity`]: database name and schema version
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use rusqlite::Connection;
//! use tabula::database::DatabaseConfig;
//! use tabula::{DatabaseIdentity, HookResult, SchemaCoordinator, TableModule};
//!
//! struct Notes;
//!
//! impl TableModule for Notes {
//!     fn name(&self) -> &'static str {
//!         "notes"
//!     }
//!
//!     fn create_tables(&self, conn: &Connection) -> HookResult {
//!         conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)")?;
//!         Ok(())
//!     }
//!
//!     fn on_upgrade(&self, _: &Connection, _: u32, _: u32) -> HookResult {
//!         Ok(())
//!     }
//! }
//!
//! let identity = DatabaseIdentity::new("notes.db", 1).unwrap();
//! let coordinator = SchemaCoordinator::builder(identity, DatabaseConfig::in_memory())
//!     .module(Arc::new(Notes))
//!     .build()
//!     .unwrap();
//!
//! let db = coordinator.database().unwrap();
//! let subscription = db
//!     .create_query(&["notes"], "SELECT body FROM notes", Vec::new())
//!     .subscribe()
//!     .unwrap();
//!
//! // The first emission is immediate
//! let first = subscription.try_recv().unwrap();
//! assert!(first.map_rows(|row| row.get::<_, String>(0)).unwrap().is_empty());
//!
//! db.insert("notes", "INSERT INTO notes (body) VALUES (?1)", ["hello"]).unwrap();
//! let refreshed = subscription.try_recv().unwrap();
//! assert_eq!(refreshed.map_rows(|row| row.get::<_, String>(0)).unwrap(), vec!["hello"]);
//! ```

pub mod config;
pub mod coordinator;
pub mod database;
pub mod error;
pub mod identity;
pub mod logging;
pub mod module;
pub mod reactive;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use coordinator::{SchemaCoordinator, SchemaCoordinatorBuilder};
pub use database::{DatabaseConfig, LifecycleEvent, ReactiveDatabase, Transaction};
pub use error::{Error, HookError, Result};
pub use identity::DatabaseIdentity;
pub use logging::{init_logger, LogLevel, Logger};
pub use module::{HookResult, ModuleRegistry, TableModule};
pub use reactive::{Query, QueryObservable, Subscription};
