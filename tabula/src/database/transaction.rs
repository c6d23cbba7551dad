//! Write transactions with change tracking.
//!
//! A [`Transaction`] records which tables its statements touched. The set is
//! handed to the change notifier only after `COMMIT` succeeds, so
//! subscribers never observe a write that was rolled back.

use std::collections::BTreeSet;

use rusqlite::{Connection, Params};

use crate::error::Result;
use crate::reactive::normalize_table;

/// A write transaction on the shared database handle.
///
/// Obtained through [`ReactiveDatabase::transaction`](super::ReactiveDatabase::transaction).
/// The transaction commits when the closure returns `Ok` and rolls back
/// otherwise.
///
/// # Examples
///
/// ```no_run
/// # fn demo(db: &tabula::ReactiveDatabase) -> tabula::Result<()> {
/// db.transaction(|tx| {
///     tx.insert("users", "INSERT INTO users (name) VALUES (?1)", ["ada"])?;
///     tx.modify("users", "UPDATE users SET name = ?1 WHERE name = ?2", ["grace", "ada"])?;
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct Transaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
    triggers: BTreeSet<String>,
    logging: bool,
}

impl<'conn> Transaction<'conn> {
    pub(crate) fn new(tx: rusqlite::Transaction<'conn>, logging: bool) -> Self {
        Self {
            tx,
            triggers: BTreeSet::new(),
            logging,
        }
    }

    /// Returns the underlying connection for reads inside the transaction.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    /// Executes a statement without notifying any table.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        if self.logging {
            log::debug!(target: "tabula::sql", "EXECUTE {}", sql.trim());
        }
        Ok(self.tx.execute(sql, params)?)
    }

    /// Executes a statement and marks every table in `tables` as changed,
    /// regardless of how many rows were affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn execute_and_trigger<P: Params>(
        &mut self,
        tables: &[&str],
        sql: &str,
        params: P,
    ) -> Result<usize> {
        let changed = self.execute(sql, params)?;
        for table in tables {
            self.trigger(table);
        }
        Ok(changed)
    }

    /// Executes an insert and marks `table` as changed when a row was
    /// inserted.
    ///
    /// Returns the rowid of the new row, or `None` when the statement
    /// inserted nothing (for example `INSERT OR IGNORE` on a conflict).
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn insert<P: Params>(&mut self, table: &str, sql: &str, params: P) -> Result<Option<i64>> {
        if self.execute(sql, params)? == 0 {
            return Ok(None);
        }
        self.trigger(table);
        Ok(Some(self.tx.last_insert_rowid()))
    }

    /// Executes an update or delete and marks `table` as changed when at
    /// least one row was affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn modify<P: Params>(&mut self, table: &str, sql: &str, params: P) -> Result<usize> {
        let changed = self.execute(sql, params)?;
        if changed > 0 {
            self.trigger(table);
        }
        Ok(changed)
    }

    /// Marks `table` as changed without executing anything.
    pub fn trigger(&mut self, table: &str) {
        let table = normalize_table(table);
        if self.logging && !self.triggers.contains(&table) {
            log::debug!(target: "tabula::sql", "TRIGGER {table}");
        }
        self.triggers.insert(table);
    }

    /// Returns the tables marked as changed so far.
    pub fn triggered_tables(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(String::as_str)
    }

    /// Commits and returns the set of changed tables.
    pub(crate) fn commit(self) -> Result<BTreeSet<String>> {
        self.tx.commit()?;
        Ok(self.triggers)
    }
}
