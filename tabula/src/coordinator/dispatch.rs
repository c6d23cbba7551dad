//! Bridges the physical open to the module registry.

use std::sync::Weak;

use rusqlite::Connection;

use crate::database::{LifecycleEvent, SchemaCallbacks};
use crate::error::{Error, Result};
use crate::module::ModuleRegistry;

/// Lifecycle callbacks owned by the database handle.
///
/// Modules may hold clones of the handle, and the handle owns this
/// dispatcher, so the registry is held weakly to keep that loop from
/// leaking.
pub(crate) struct SchemaDispatcher {
    version: u32,
    registry: Weak<ModuleRegistry>,
}

impl SchemaDispatcher {
    pub(crate) fn new(version: u32, registry: Weak<ModuleRegistry>) -> Self {
        Self { version, registry }
    }
}

impl SchemaCallbacks for SchemaDispatcher {
    fn version(&self) -> u32 {
        self.version
    }

    fn on_lifecycle(&self, conn: &Connection, event: LifecycleEvent) -> Result<()> {
        // The coordinator is gone; only module-held handle clones remain
        let registry = self.registry.upgrade().ok_or(Error::UseAfterClose)?;
        log::debug!("dispatching {event} to {} module(s)", registry.len());
        registry.dispatch(conn, event)
    }
}
