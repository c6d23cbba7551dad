//! The shared reactive database handle.
//!
//! One [`ReactiveDatabase`] exists per coordinator. Clones share the same
//! connection, notifier and lifecycle state. The physical connection is
//! opened lazily by the first operation that needs it, and that open runs
//! the create/upgrade lifecycle.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use rusqlite::types::Value;
use rusqlite::{Connection, Params, TransactionBehavior};

use crate::error::{Error, Result};
use crate::reactive::{normalize_table, ChangeNotifier, QueryObservable};

use super::config::DatabaseConfig;
use super::connection::{open_connection, SchemaCallbacks};
use super::error_handler::DatabaseErrorHandler;
use super::transaction::Transaction;

enum ConnectionState {
    Unopened,
    Open(Connection),
    Closed,
}

impl ConnectionState {
    const fn label(&self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Open(_) => "open",
            Self::Closed => "closed",
        }
    }
}

struct Shared {
    config: DatabaseConfig,
    path: Option<PathBuf>,
    callbacks: Box<dyn SchemaCallbacks>,
    error_handler: Arc<dyn DatabaseErrorHandler>,
    state: Mutex<ConnectionState>,
    // Thread currently holding `state`, used to turn re-entry into an error
    owner: Mutex<Option<ThreadId>>,
    logging: AtomicBool,
    open: AtomicBool,
    notifier: ChangeNotifier,
}

/// Exclusive access to the connection state.
struct StateGuard<'a> {
    state: MutexGuard<'a, ConnectionState>,
    owner: &'a Mutex<Option<ThreadId>>,
}

impl Deref for StateGuard<'_> {
    type Target = ConnectionState;

    fn deref(&self) -> &ConnectionState {
        &self.state
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut ConnectionState {
        &mut self.state
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        *lock(self.owner) = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to the coordinator's database.
///
/// All reads and writes go through this handle. Writes made through
/// [`transaction`](Self::transaction) and the single-statement helpers
/// notify subscribed queries once they commit.
///
/// Access is serialized through one connection; calling back into the
/// handle from inside a transaction closure or a lifecycle hook on the same
/// thread returns [`Error::ReentrantAccess`] instead of deadlocking.
#[derive(Clone)]
pub struct ReactiveDatabase {
    inner: Arc<Shared>,
}

impl ReactiveDatabase {
    pub(crate) fn new(
        config: DatabaseConfig,
        path: Option<PathBuf>,
        callbacks: Box<dyn SchemaCallbacks>,
        error_handler: Arc<dyn DatabaseErrorHandler>,
    ) -> Self {
        let logging = AtomicBool::new(config.log_statements);
        Self {
            inner: Arc::new(Shared {
                config,
                path,
                callbacks,
                error_handler,
                state: Mutex::new(ConnectionState::Unopened),
                owner: Mutex::new(None),
                logging,
                open: AtomicBool::new(false),
                notifier: ChangeNotifier::new(),
            }),
        }
    }

    /// Returns the database file path, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    fn acquire(&self) -> Result<StateGuard<'_>> {
        let me = thread::current().id();
        if *lock(&self.inner.owner) == Some(me) {
            return Err(Error::ReentrantAccess);
        }

        let state = lock(&self.inner.state);
        *lock(&self.inner.owner) = Some(me);
        Ok(StateGuard {
            state,
            owner: &self.inner.owner,
        })
    }

    /// Returns the open connection, opening it first if necessary.
    fn connection<'g>(&self, guard: &'g mut StateGuard<'_>) -> Result<&'g mut Connection> {
        if matches!(**guard, ConnectionState::Unopened) {
            log::debug!(
                "opening database {}",
                self.path().map_or_else(|| ":memory:".into(), |p| p.display().to_string())
            );
            let conn = open_connection(
                &self.inner.config,
                self.path(),
                self.inner.callbacks.as_ref(),
                self.inner.error_handler.as_ref(),
            )?;
            **guard = ConnectionState::Open(conn);
            self.inner.open.store(true, Ordering::Release);
        }

        match &mut **guard {
            ConnectionState::Open(conn) => Ok(conn),
            _ => Err(Error::UseAfterClose),
        }
    }

    /// Opens the physical database if it is not open yet.
    ///
    /// # Errors
    ///
    /// Returns any error from the physical open or the lifecycle dispatch,
    /// or [`Error::UseAfterClose`] after [`close`](Self::close).
    pub fn open(&self) -> Result<()> {
        let mut guard = self.acquire()?;
        self.connection(&mut guard)?;
        Ok(())
    }

    /// Returns whether a physical connection is currently held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Runs a read-only closure against the connection.
    ///
    /// Writes issued here bypass change tracking; use
    /// [`transaction`](Self::transaction) for writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the closure fails.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let mut guard = self.acquire()?;
        let conn = self.connection(&mut guard)?;
        Ok(f(conn)?)
    }

    /// Executes a statement that touches no observed table, such as DDL or
    /// a PRAGMA.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the statement fails.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.log_statement("EXECUTE", sql);
        let mut guard = self.acquire()?;
        let conn = self.connection(&mut guard)?;
        Ok(conn.execute(sql, params)?)
    }

    /// Executes a statement in its own transaction and notifies `tables`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the statement fails.
    pub fn execute_and_trigger<P: Params>(&self, tables: &[&str], sql: &str, params: P) -> Result<usize> {
        self.transaction(|tx| tx.execute_and_trigger(tables, sql, params))
    }

    /// Executes an insert in its own transaction and notifies `table` when a
    /// row was inserted. Returns the new rowid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the statement fails.
    pub fn insert<P: Params>(&self, table: &str, sql: &str, params: P) -> Result<Option<i64>> {
        self.transaction(|tx| tx.insert(table, sql, params))
    }

    /// Executes an update or delete in its own transaction and notifies
    /// `table` when rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the statement fails.
    pub fn modify<P: Params>(&self, table: &str, sql: &str, params: P) -> Result<usize> {
        self.transaction(|tx| tx.modify(table, sql, params))
    }

    /// Runs `f` inside an immediate write transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`. Subscribers of every table marked as changed are
    /// notified after the commit, in commit order.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if the database cannot be
    /// opened or the transaction cannot begin or commit.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn demo(db: &tabula::ReactiveDatabase) -> tabula::Result<()> {
    /// let inserted = db.transaction(|tx| {
    ///     let mut count = 0;
    ///     for name in ["ada", "grace"] {
    ///         tx.insert("users", "INSERT INTO users (name) VALUES (?1)", [name])?;
    ///         count += 1;
    ///     }
    ///     Ok(count)
    /// })?;
    /// assert_eq!(inserted, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut guard = self.acquire()?;
        let conn = self.connection(&mut guard)?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut tx = Transaction::new(tx, self.is_logging_enabled());
        let value = f(&mut tx)?;
        let changed = tx.commit()?;

        if !changed.is_empty() {
            let woken = self.inner.notifier.notify(&changed);
            if self.is_logging_enabled() {
                log::debug!(
                    target: "tabula::sql",
                    "COMMIT changed {changed:?}, {woken} subscription(s) refreshed"
                );
            }
        }

        Ok(value)
    }

    /// Creates a reactive query over `tables`.
    ///
    /// Nothing runs until the observable is subscribed to or its query is
    /// executed.
    #[must_use]
    pub fn create_query(&self, tables: &[&str], sql: &str, params: Vec<Value>) -> QueryObservable {
        let tables: BTreeSet<String> = tables.iter().map(|t| normalize_table(t)).collect();
        QueryObservable::new(self.clone(), tables, sql, params)
    }

    /// Toggles statement logging at debug level on the `tabula::sql` target.
    pub fn set_logging_enabled(&self, enabled: bool) {
        self.inner.logging.store(enabled, Ordering::Relaxed);
    }

    /// Returns whether statement logging is enabled.
    #[must_use]
    pub fn is_logging_enabled(&self) -> bool {
        self.inner.logging.load(Ordering::Relaxed)
    }

    pub(crate) fn log_statement(&self, kind: &str, sql: &str) {
        if self.is_logging_enabled() {
            log::debug!(target: "tabula::sql", "{kind} {}", sql.trim());
        }
    }

    pub(crate) fn notifier(&self) -> &ChangeNotifier {
        &self.inner.notifier
    }

    /// Closes the handle and ends every subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterClose`] if the handle was already closed, or
    /// the engine's error if the connection fails to close cleanly (the
    /// handle is closed either way).
    pub fn close(&self) -> Result<()> {
        let mut guard = self.acquire()?;
        let previous = mem::replace(&mut *guard, ConnectionState::Closed);
        self.inner.open.store(false, Ordering::Release);
        drop(guard);

        self.inner.notifier.close();

        match previous {
            ConnectionState::Closed => Err(Error::UseAfterClose),
            ConnectionState::Unopened => Ok(()),
            ConnectionState::Open(conn) => conn.close().map_err(|(_, e)| Error::Database(e)),
        }
    }

    /// Returns whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.notifier.is_closed()
    }

    /// Drops the physical connection so the next operation reopens it.
    ///
    /// Returns whether a connection was open. A closed handle stays closed.
    pub(crate) fn discard_connection(&self) -> Result<bool> {
        let mut guard = self.acquire()?;
        match mem::replace(&mut *guard, ConnectionState::Unopened) {
            ConnectionState::Open(conn) => {
                self.inner.open.store(false, Ordering::Release);
                drop(guard);
                conn.close().map_err(|(_, e)| Error::Database(e))?;
                Ok(true)
            }
            ConnectionState::Unopened => Ok(false),
            ConnectionState::Closed => {
                *guard = ConnectionState::Closed;
                Ok(false)
            }
        }
    }
}

impl fmt::Debug for ReactiveDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.state.try_lock() {
            Ok(state) => state.label(),
            Err(_) => "busy",
        };
        f.debug_struct("ReactiveDatabase")
            .field("path", &self.inner.path)
            .field("state", &state)
            .field("logging", &self.is_logging_enabled())
            .finish_non_exhaustive()
    }
}
