//! The schema coordinator.
//!
//! A [`SchemaCoordinator`] owns the ordered registry of table modules and the
//! single [`ReactiveDatabase`] handle they share. The first access to the
//! handle opens the database file and, depending on the stored version,
//! fans a create or upgrade event out to every module in registration
//! order. Later accesses reuse the open handle.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use rusqlite::Connection;
//! use tabula::database::DatabaseConfig;
//! use tabula::{DatabaseIdentity, HookResult, SchemaCoordinator, TableModule};
//!
//! struct Users;
//!
//! impl TableModule for Users {
//!     fn name(&self) -> &'static str {
//!         "users"
//!     }
//!
//!     fn create_tables(&self, conn: &Connection) -> HookResult {
//!         conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!         Ok(())
//!     }
//!
//!     fn on_upgrade(&self, _: &Connection, _: u32, _: u32) -> HookResult {
//!         Ok(())
//!     }
//! }
//!
//! let identity = DatabaseIdentity::new("app.db", 1).unwrap();
//! let modules: Vec<Arc<dyn TableModule>> = vec![Arc::new(Users)];
//! let coordinator = SchemaCoordinator::new(identity, DatabaseConfig::in_memory(), modules).unwrap();
//!
//! let db = coordinator.database().unwrap();
//! db.insert("users", "INSERT INTO users (name) VALUES (?1)", ["ada"]).unwrap();
//! ```

mod builder;
mod dispatch;

#[cfg(test)]
mod proptests;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::database::{
    delete_database_files, DatabaseConfig, DatabaseErrorHandler, DeleteOnCorruption,
    ReactiveDatabase,
};
use crate::error::Result;
use crate::identity::DatabaseIdentity;
use crate::module::{ModuleRegistry, TableModule};

pub use builder::SchemaCoordinatorBuilder;
use dispatch::SchemaDispatcher;

/// Coordinates schema ownership across table modules sharing one database.
pub struct SchemaCoordinator {
    identity: DatabaseIdentity,
    registry: Arc<ModuleRegistry>,
    db: ReactiveDatabase,
}

impl SchemaCoordinator {
    /// Creates a coordinator with the default corruption handler.
    ///
    /// Every module's [`bind_database`](TableModule::bind_database) is called
    /// before this returns. The database file is not touched until the first
    /// call to [`database`](Self::database).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateModule`](crate::Error::DuplicateModule) if
    /// the same module instance appears twice in `modules`.
    pub fn new(
        identity: DatabaseIdentity,
        config: DatabaseConfig,
        modules: Vec<Arc<dyn TableModule>>,
    ) -> Result<Self> {
        Self::from_parts(identity, config, modules, Arc::new(DeleteOnCorruption))
    }

    /// Returns a builder for adding modules one at a time.
    #[must_use]
    pub fn builder(identity: DatabaseIdentity, config: DatabaseConfig) -> SchemaCoordinatorBuilder {
        SchemaCoordinatorBuilder::new(identity, config)
    }

    fn from_parts(
        identity: DatabaseIdentity,
        config: DatabaseConfig,
        modules: Vec<Arc<dyn TableModule>>,
        error_handler: Arc<dyn DatabaseErrorHandler>,
    ) -> Result<Self> {
        let registry = Arc::new(ModuleRegistry::new(modules)?);
        let path = config.database_path(identity.name());
        let dispatcher = SchemaDispatcher::new(identity.version(), Arc::downgrade(&registry));
        let db = ReactiveDatabase::new(config, path, Box::new(dispatcher), error_handler);

        registry.bind(&db);
        log::debug!(
            "coordinator for {identity} registered modules {:?}",
            registry.names()
        );

        Ok(Self {
            identity,
            registry,
            db,
        })
    }

    /// Returns the shared database handle, opening the database first.
    ///
    /// The first call runs the create or upgrade lifecycle. If that fails
    /// the handle stays unopened and the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Downgrade`](crate::Error::Downgrade) when the file
    /// is newer than the configured version, a create/upgrade failure naming
    /// the module that failed, [`Error::UseAfterClose`](crate::Error::UseAfterClose)
    /// after [`close`](Self::close), or any engine error from the open.
    pub fn database(&self) -> Result<&ReactiveDatabase> {
        self.db.open()?;
        Ok(&self.db)
    }

    /// Returns the configured schema version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.identity.version()
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Returns the database identity.
    #[must_use]
    pub const fn identity(&self) -> &DatabaseIdentity {
        &self.identity
    }

    /// Returns the database file path, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    /// Returns registered module names in dispatch order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Toggles statement logging on the shared handle.
    pub fn set_logging(&self, enabled: bool) {
        self.db.set_logging_enabled(enabled);
    }

    /// Deletes the database file and its journal companions.
    ///
    /// Any open connection is dropped first, so the next call to
    /// [`database`](Self::database) creates the schema from scratch.
    /// Subscriptions stay alive and are woken so they re-run against the
    /// new file. Returns whether the main file existed; for an in-memory
    /// database, returns whether it had been opened.
    ///
    /// This is not guarded against concurrent use of the handle by other
    /// processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be closed or a file cannot
    /// be removed.
    pub fn delete_database(&self) -> Result<bool> {
        let was_open = self.db.discard_connection()?;

        let existed = match self.path() {
            Some(path) => {
                let existed = delete_database_files(path)?;
                log::info!("deleted database {}", path.display());
                existed
            }
            None => was_open,
        };

        self.db.notifier().notify_all();
        Ok(existed)
    }

    /// Closes the shared handle and ends every subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterClose`](crate::Error::UseAfterClose) when
    /// called a second time.
    pub fn close(&self) -> Result<()> {
        self.db.close()
    }
}

impl Drop for SchemaCoordinator {
    fn drop(&mut self) {
        if !self.db.is_closed() {
            if let Err(e) = self.db.close() {
                log::warn!("failed to close database {}: {e}", self.identity);
            }
        }
    }
}

impl fmt::Debug for SchemaCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCoordinator")
            .field("identity", &self.identity)
            .field("modules", &self.registry)
            .field("db", &self.db)
            .finish()
    }
}
