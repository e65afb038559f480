//! SQLite-backed persistent store.
//!
//! - config: pool options and the bb8 connection manager
//! - connection: pooled connection wrapper and the blocking hop
//! - schema: table creation and additive migrations

pub mod config;
pub mod connection;
pub mod schema;

use std::path::{Path, PathBuf};

use bb8::Pool;

pub use config::{SqliteManager, StoreOptions, StoreOptionsBuilder};
pub use connection::StoreConnection;
pub use schema::MigrationReport;

use crate::error::CirculationError;

/// Handle to the circulation database. Cheap to clone; all clones share one pool.
#[derive(Clone, Debug)]
pub struct Store {
    pool: Pool<SqliteManager>,
    db_path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the database file and migrate its schema.
    ///
    /// # Errors
    /// Returns `CirculationError` if the pool cannot be created or the migration fails.
    pub async fn open(opts: StoreOptions) -> Result<Self, CirculationError> {
        let StoreOptions {
            db_path,
            pool_size,
            busy_timeout,
        } = opts;

        let pool = SqliteManager::new(db_path.clone(), busy_timeout)
            .build_pool(pool_size)
            .await?;
        let store = Store { pool, db_path };

        let conn = store.connection().await?;
        let report = connection::run_blocking(conn.conn_handle(), schema::migrate).await?;
        if !report.added_columns.is_empty() {
            tracing::info!(columns = ?report.added_columns, "added missing columns");
        }
        if report.normalized_rows > 0 {
            tracing::info!(rows = report.normalized_rows, "normalized legacy status/action values");
        }
        tracing::info!(path = %store.db_path.display(), pool_size, "store ready");
        Ok(store)
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns `CirculationError::ConnectionError` if checkout times out or the connection cannot be opened.
    pub async fn connection(&self) -> Result<StoreConnection, CirculationError> {
        let conn = self.pool.get_owned().await?;
        Ok(StoreConnection::new(conn))
    }

    /// Run read-only work on a pooled connection.
    ///
    /// # Errors
    /// Propagates checkout errors and any error returned by `func`.
    pub async fn read<F, R>(&self, func: F) -> Result<R, CirculationError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<R, CirculationError> + Send + 'static,
        R: Send + 'static,
    {
        self.connection().await?.read(func).await
    }

    /// Run `func` as one immediate transaction on a pooled connection.
    ///
    /// # Errors
    /// Propagates checkout errors and any error returned by `func`; nothing is committed on error.
    pub async fn write<F, R>(&self, func: F) -> Result<R, CirculationError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<R, CirculationError> + Send + 'static,
        R: Send + 'static,
    {
        self.connection().await?.write(func).await
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
