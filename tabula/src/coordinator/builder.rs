//! Incremental construction of a [`SchemaCoordinator`].

use std::fmt;
use std::sync::Arc;

use crate::database::{DatabaseConfig, DatabaseErrorHandler, DeleteOnCorruption};
use crate::error::Result;
use crate::identity::DatabaseIdentity;
use crate::module::TableModule;

use super::SchemaCoordinator;

/// Builder for [`SchemaCoordinator`].
///
/// Modules are dispatched to in the order they are added.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rusqlite::Connection;
/// use tabula::database::{DatabaseConfig, KeepOnCorruption};
/// use tabula::{DatabaseIdentity, HookResult, SchemaCoordinator, TableModule};
///
/// struct Users;
///
/// impl TableModule for Users {
///     fn create_tables(&self, conn: &Connection) -> HookResult {
///         conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY)")?;
///         Ok(())
///     }
///
///     fn on_upgrade(&self, _: &Connection, _: u32, _: u32) -> HookResult {
///         Ok(())
///     }
/// }
///
/// let identity = DatabaseIdentity::new("app.db", 1).unwrap();
/// let coordinator = SchemaCoordinator::builder(identity, DatabaseConfig::in_memory())
///     .module(Arc::new(Users))
///     .error_handler(Arc::new(KeepOnCorruption))
///     .build()
///     .unwrap();
/// assert_eq!(coordinator.module_names().len(), 1);
/// ```
pub struct SchemaCoordinatorBuilder {
    identity: DatabaseIdentity,
    config: DatabaseConfig,
    modules: Vec<Arc<dyn TableModule>>,
    error_handler: Option<Arc<dyn DatabaseErrorHandler>>,
}

impl SchemaCoordinatorBuilder {
    pub(crate) fn new(identity: DatabaseIdentity, config: DatabaseConfig) -> Self {
        Self {
            identity,
            config,
            modules: Vec::new(),
            error_handler: None,
        }
    }

    /// Appends a table module.
    #[must_use]
    pub fn module(mut self, module: Arc<dyn TableModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// Appends several table modules, keeping their order.
    #[must_use]
    pub fn modules(mut self, modules: impl IntoIterator<Item = Arc<dyn TableModule>>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Sets the handler invoked when the database file is corrupt.
    ///
    /// Defaults to [`DeleteOnCorruption`].
    #[must_use]
    pub fn error_handler(mut self, handler: Arc<dyn DatabaseErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Builds the coordinator. No file I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateModule`](crate::Error::DuplicateModule) if
    /// the same module instance was added twice.
    pub fn build(self) -> Result<SchemaCoordinator> {
        let error_handler = self
            .error_handler
            .unwrap_or_else(|| Arc::new(DeleteOnCorruption));
        SchemaCoordinator::from_parts(self.identity, self.config, self.modules, error_handler)
    }
}

impl fmt::Debug for SchemaCoordinatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCoordinatorBuilder")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("modules", &self.modules.len())
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
