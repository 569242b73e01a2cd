//! Connection pool for the embedded SQLite store.
//!
//! Wraps Diesel's `r2d2` support and tunes every acquired connection for
//! the concurrency model in use: WAL journalling gives concurrent readers
//! with serialised writers, `synchronous=NORMAL` relaxes commit durability,
//! and a busy timeout keeps short write collisions from surfacing as
//! errors.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;

/// A pooled store connection.
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },

    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },
}

impl PoolError {
    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SqliteTuning;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteTuning {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Configuration for the store connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_path: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration for the given SQLite database path.
    ///
    /// Defaults: 8 connections, 30 second checkout timeout.
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            max_size: 8,
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database path.
    pub fn database_path(&self) -> &str {
        &self.database_path
    }
}

/// Connection pool over the embedded SQLite store.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<ConnectionManager<SqliteConnection>>,
}

impl DbPool {
    /// Build a pool from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the database file cannot be opened
    /// or the initial connections cannot be established.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = ConnectionManager::<SqliteConnection>::new(config.database_path());
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .connection_customizer(Box::new(SqliteTuning))
            .build(manager)
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes available
    /// within the configured timeout.
    pub fn get(&self) -> Result<DbConnection, PoolError> {
        self.inner
            .get()
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_config_defaults() {
        let config = PoolConfig::new("routelink.db");
        assert_eq!(config.database_path(), "routelink.db");
        assert_eq!(config.max_size, 8);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }

    #[rstest]
    fn pool_config_builder_pattern() {
        let config = PoolConfig::new("routelink.db")
            .with_max_size(2)
            .with_connection_timeout(Duration::from_secs(5));
        assert_eq!(config.max_size, 2);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn in_memory_pool_builds_and_hands_out_connections() {
        let pool = DbPool::new(PoolConfig::new(":memory:").with_max_size(1)).expect("pool builds");
        pool.get().expect("connection available");
    }
}
