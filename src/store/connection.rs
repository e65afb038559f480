use std::fmt;
use std::sync::Arc;

use rusqlite::TransactionBehavior;

use super::config::{SharedSqliteConnection, SqlitePooledConnection};
use crate::error::CirculationError;

/// Connection checked out of the store pool.
pub struct StoreConnection {
    conn: SqlitePooledConnection,
}

impl StoreConnection {
    pub(crate) fn new(conn: SqlitePooledConnection) -> Self {
        Self { conn }
    }

    /// Run read-only work in autocommit mode.
    ///
    /// # Errors
    /// Propagates any error returned by `func` or by the blocking hop itself.
    pub async fn read<F, R>(&self, func: F) -> Result<R, CirculationError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<R, CirculationError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.conn_handle(), move |guard| func(&*guard)).await
    }

    /// Run `func` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so a check-then-write sequence inside `func`
    /// cannot interleave with another writer. Returning an error rolls everything back.
    ///
    /// # Errors
    /// Returns the error from `func`, or `CirculationError::SqliteError` if begin/commit fails.
    pub async fn write<F, R>(&self, func: F) -> Result<R, CirculationError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<R, CirculationError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.conn_handle(), move |guard| {
            let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
            // dropping `tx` on the error path rolls back
            let out = func(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }

    pub(crate) fn conn_handle(&self) -> SharedSqliteConnection {
        Arc::clone(&*self.conn)
    }
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnection").finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, CirculationError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, CirculationError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await?
}
