//! SQLite connection pool wrapper.

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tracing::info;

use tutorkit_core::error::StorageError;

/// Manages a single SQLite pool; creates the database file if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given database path.
    pub async fn new(database_path: &str) -> Result<Self, StorageError> {
        info!(database_path, "initializing SQLite pool");

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_path);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
