use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bb8::{ManageConnection, Pool, PooledConnection};
use tokio::sync::Mutex;

use super::connection::run_blocking;
use super::Store;
use crate::error::CirculationError;

/// A `rusqlite` connection shared with the blocking thread that runs each statement batch.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;
pub type SqlitePooledConnection = PooledConnection<'static, SqliteManager>;

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for opening the circulation store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub db_path: PathBuf,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl StoreOptions {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<PathBuf>) -> StoreOptionsBuilder {
        StoreOptionsBuilder::new(db_path)
    }
}

/// Fluent builder for `StoreOptions`.
#[derive(Debug, Clone)]
pub struct StoreOptionsBuilder {
    opts: StoreOptions,
}

impl StoreOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            opts: StoreOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.opts.pool_size = pool_size.max(1);
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn finish(self) -> StoreOptions {
        self.opts
    }

    /// Open the pool and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `CirculationError` if pool creation or the schema migration fails.
    pub async fn build(self) -> Result<Store, CirculationError> {
        Store::open(self.finish()).await
    }
}

/// bb8 manager for file-backed `SQLite` connections.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteManager {
    #[must_use]
    pub fn new(db_path: PathBuf, busy_timeout: Duration) -> Self {
        Self {
            db_path,
            busy_timeout,
        }
    }

    /// Build a pool from this manager.
    ///
    /// # Errors
    /// Returns `CirculationError::ConnectionError` if the initial connections cannot be opened.
    pub async fn build_pool(self, max_size: u32) -> Result<Pool<SqliteManager>, CirculationError> {
        Pool::builder()
            .max_size(max_size)
            .build(self)
            .await
            .map_err(|e| CirculationError::ConnectionError(format!("sqlite pool error: {e}")))
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = CirculationError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let db_path = self.db_path.clone();
        let busy_timeout = self.busy_timeout;
        async move {
            let conn =
                tokio::task::spawn_blocking(move || open_connection(&db_path, busy_timeout))
                    .await??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            run_blocking(handle, |guard| {
                guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

fn open_connection(
    db_path: &Path,
    busy_timeout: Duration,
) -> Result<rusqlite::Connection, CirculationError> {
    let conn = rusqlite::Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)?;
    // journal_mode reports the resulting mode as a row
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    Ok(conn)
}
