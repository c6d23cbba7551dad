//! Table modules and their ordered registry.
//!
//! A table module owns the DDL for one or more tables and knows how to
//! migrate them between schema versions. Modules are registered with a
//! [`SchemaCoordinator`](crate::SchemaCoordinator), which calls their hooks
//! in registration order whenever the database is created or upgraded.

use std::fmt;
use std::sync::Arc;

use rusqlite::Connection;

use crate::database::{LifecycleEvent, ReactiveDatabase};
use crate::error::{Error, HookError, Result};

/// Result of a table module hook.
pub type HookResult = std::result::Result<(), HookError>;

/// A pluggable component that owns the schema of one or more tables.
///
/// Hooks run synchronously on the connection being opened and must use that
/// connection. When atomic schema changes are enabled (the default), every
/// module's hook runs inside the same transaction as the version bump.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use tabula::{HookResult, TableModule};
///
/// struct Users;
///
/// impl TableModule for Users {
///     fn name(&self) -> &'static str {
///         "users"
///     }
///
///     fn create_tables(&self, conn: &Connection) -> HookResult {
///         conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
///         Ok(())
///     }
///
///     fn on_upgrade(&self, conn: &Connection, old_version: u32, _new_version: u32) -> HookResult {
///         if old_version < 2 {
///             conn.execute_batch("ALTER TABLE users ADD COLUMN email TEXT")?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait TableModule: Send + Sync {
    /// Returns a name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Receives the shared database handle.
    ///
    /// Called exactly once, when the coordinator is constructed and before
    /// the database is opened. Modules that issue queries later keep a clone.
    fn bind_database(&self, db: &ReactiveDatabase) {
        let _ = db;
    }

    /// Creates this module's tables in a fresh database.
    ///
    /// # Errors
    ///
    /// Any error aborts the create; later modules are not called.
    fn create_tables(&self, conn: &Connection) -> HookResult;

    /// Migrates this module's tables from `old_version` to `new_version`.
    ///
    /// The gap may span several versions.
    ///
    /// # Errors
    ///
    /// Any error aborts the upgrade; later modules are not called.
    fn on_upgrade(&self, conn: &Connection, old_version: u32, new_version: u32) -> HookResult;
}

/// The ordered, frozen set of table modules a coordinator dispatches to.
///
/// Uniqueness is by instance: registering the same `Arc` twice is an error,
/// while two distinct instances of the same type are allowed.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn TableModule>>,
}

impl ModuleRegistry {
    /// Builds a registry, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateModule`] if an instance appears twice.
    pub fn new(modules: Vec<Arc<dyn TableModule>>) -> Result<Self> {
        for (position, module) in modules.iter().enumerate() {
            let duplicate = modules[..position]
                .iter()
                .any(|earlier| same_instance(earlier, module));
            if duplicate {
                return Err(Error::DuplicateModule {
                    module: module.name(),
                    position,
                });
            }
        }

        Ok(Self { modules })
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates over the modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TableModule>> {
        self.modules.iter()
    }

    /// Returns module names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub(crate) fn bind(&self, db: &ReactiveDatabase) {
        for module in &self.modules {
            module.bind_database(db);
        }
    }

    /// Fans a lifecycle event out to every module, stopping at the first
    /// failure.
    pub(crate) fn dispatch(&self, conn: &Connection, event: LifecycleEvent) -> Result<()> {
        for module in &self.modules {
            let module_name = module.name();
            match event {
                LifecycleEvent::Create { .. } => {
                    log::debug!("creating tables for module {module_name}");
                    module
                        .create_tables(conn)
                        .map_err(|source| Error::CreateFailure {
                            module: module_name,
                            source,
                        })?;
                }
                LifecycleEvent::Upgrade {
                    old_version,
                    new_version,
                } => {
                    log::debug!(
                        "upgrading module {module_name} from v{old_version} to v{new_version}"
                    );
                    module
                        .on_upgrade(conn, old_version, new_version)
                        .map_err(|source| Error::UpgradeFailure {
                            module: module_name,
                            old_version,
                            new_version,
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn same_instance(a: &Arc<dyn TableModule>, b: &Arc<dyn TableModule>) -> bool {
    // Compare data pointers only; vtable pointers are not unique per type
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}
