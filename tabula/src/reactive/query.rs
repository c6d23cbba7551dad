//! Reactive queries and subscriptions.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Row};

use crate::database::ReactiveDatabase;
use crate::error::Result;

/// A query bound to the set of tables it reads.
///
/// Created by [`ReactiveDatabase::create_query`]. Each call to
/// [`subscribe`](Self::subscribe) starts an independent subscription, so the
/// same observable can be subscribed to any number of times.
///
/// # Examples
///
/// ```no_run
/// # fn demo(db: &tabula::ReactiveDatabase) -> tabula::Result<()> {
/// let names = db.create_query(&["users"], "SELECT name FROM users ORDER BY name", Vec::new());
/// for query in names.subscribe()? {
///     let rows: Vec<String> = query.map_rows(|row| row.get(0))?;
///     println!("{rows:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryObservable {
    tables: BTreeSet<String>,
    query: Query,
}

impl QueryObservable {
    pub(crate) fn new(db: ReactiveDatabase, tables: BTreeSet<String>, sql: &str, params: Vec<Value>) -> Self {
        Self {
            tables,
            query: Query {
                db,
                sql: Arc::from(sql),
                params: Arc::from(params),
            },
        }
    }

    /// Returns the (normalized) tables this query observes.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    /// Returns the query SQL.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.query.sql
    }

    /// Returns a one-shot handle for running the query without subscribing.
    #[must_use]
    pub fn query(&self) -> Query {
        self.query.clone()
    }

    /// Starts a subscription.
    ///
    /// Subscribing never blocks and never opens the database; the first
    /// emission is available immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterClose`](crate::Error::UseAfterClose) if the
    /// handle has been closed.
    pub fn subscribe(&self) -> Result<Subscription> {
        let (id, wake) = self.query.db.notifier().subscribe(self.tables.clone())?;
        Ok(Subscription {
            id,
            wake,
            query: self.query.clone(),
        })
    }
}

impl fmt::Debug for QueryObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryObservable")
            .field("tables", &self.tables)
            .field("sql", &self.query.sql)
            .finish_non_exhaustive()
    }
}

/// A lazily executed query.
///
/// Running it reads the latest committed state through the shared handle.
#[derive(Clone)]
pub struct Query {
    db: ReactiveDatabase,
    sql: Arc<str>,
    params: Arc<[Value]>,
}

impl Query {
    /// Runs the query and maps every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the query fails.
    pub fn map_rows<T, F>(&self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.db.log_statement("QUERY", &self.sql);
        self.db.read(|conn| {
            let mut stmt = conn.prepare_cached(&self.sql)?;
            let rows = stmt
                .query_map(params_from_iter(self.params.iter()), |row| f(row))?
                .collect::<rusqlite::Result<Vec<T>>>()?;
            Ok(rows)
        })
    }

    /// Runs the query and maps the first row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the query fails.
    pub fn map_first<T, F>(&self, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.db.log_statement("QUERY", &self.sql);
        self.db.read(|conn| {
            conn.query_row(&self.sql, params_from_iter(self.params.iter()), f)
                .optional()
        })
    }

    /// Returns the query SQL.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A live subscription to a [`QueryObservable`].
///
/// Yields a [`Query`] once immediately and again after every committed
/// write to an observed table. Writes that land while a refresh is still
/// pending are coalesced into it. Iteration ends when the handle is closed.
/// Dropping the subscription unsubscribes.
pub struct Subscription {
    id: u64,
    wake: Receiver<()>,
    query: Query,
}

impl Subscription {
    /// Blocks until the next refresh. Returns `None` once the handle closes.
    #[must_use]
    pub fn recv(&self) -> Option<Query> {
        self.wake.recv().ok().map(|()| self.query.clone())
    }

    /// Returns the pending refresh, if any, without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<Query> {
        self.wake.try_recv().ok().map(|()| self.query.clone())
    }

    /// Waits up to `timeout` for the next refresh.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Query> {
        self.wake
            .recv_timeout(timeout)
            .ok()
            .map(|()| self.query.clone())
    }
}

impl Iterator for Subscription {
    type Item = Query;

    fn next(&mut self) -> Option<Query> {
        self.recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.query.db.notifier().unsubscribe(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("query", &self.query)
            .finish()
    }
}
