//! A pooled connection and the primitives run on it.

use crate::error::{EngineError, EngineResult};
use crate::options::BeginMode;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, ToSql};
use std::fmt;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::warn;

/// A connection checked out of an [`crate::Engine`] pool.
///
/// The connection returns to the pool when dropped. Statements are prepared
/// through SQLite's per-connection statement cache, so repeated statement
/// texts are compiled once per connection.
///
/// # Thread Safety
///
/// `EngineConnection` is `Send` but not `Sync`: it must be driven by one
/// thread at a time.
pub struct EngineConnection {
    conn: PooledConnection<SqliteConnectionManager>,
    /// Keeps a memory location's scratch directory alive. Dropped after `conn`.
    _scratch: Option<Arc<TempDir>>,
}

impl EngineConnection {
    pub(crate) fn new(
        conn: PooledConnection<SqliteConnectionManager>,
        scratch: Option<Arc<TempDir>>,
    ) -> Self {
        Self {
            conn,
            _scratch: scratch,
        }
    }

    /// Starts a transaction.
    ///
    /// A connection that comes back from the pool still inside a transaction
    /// (its owner failed to finish it) is rolled back first.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite refuses to begin.
    pub fn begin(&self, mode: BeginMode) -> EngineResult<()> {
        if !self.conn.is_autocommit() {
            warn!("pooled connection still inside a transaction, rolling back");
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.conn.execute_batch(mode.statement())?;
        Ok(())
    }

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot commit. The transaction is then
    /// still open on this connection.
    pub fn commit(&self) -> EngineResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot roll back, including when no
    /// transaction is active.
    pub fn rollback(&self) -> EngineResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Returns true when no transaction is active on this connection.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.conn.is_autocommit()
    }

    /// Runs one or more statements that take no parameters.
    ///
    /// # Errors
    ///
    /// Returns the first SQLite error.
    pub fn execute_batch(&self, sql: &str) -> EngineResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Runs a write statement, returning the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails to prepare or run.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> EngineResult<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params)?)
    }

    /// Runs a query expected to produce at most one row.
    ///
    /// Returns `Ok(None)` when the query produces no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or `map` rejects the row.
    pub fn query_row<T, F>(&self, sql: &str, params: &[&dyn ToSql], map: F) -> EngineResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.query_row(params, map).optional()?)
    }

    /// Runs a query and feeds each row to `visit` as it is stepped.
    ///
    /// Stops at the first error from `visit` and returns it unchanged. The
    /// cursor is reset when this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns engine errors converted into `E`, or the error from `visit`.
    pub fn query_each<E, F>(&self, sql: &str, params: &[&dyn ToSql], mut visit: F) -> Result<(), E>
    where
        E: From<EngineError>,
        F: FnMut(&Row<'_>) -> Result<(), E>,
    {
        let mut stmt = self.conn.prepare_cached(sql).map_err(EngineError::from)?;
        let mut rows = stmt.query(params).map_err(EngineError::from)?;
        while let Some(row) = rows.next().map_err(EngineError::from)? {
            visit(row)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EngineConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConnection")
            .field("autocommit", &self.is_autocommit())
            .finish()
    }
}
