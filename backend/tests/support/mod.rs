//! Shared fixtures for integration tests.
//!
//! Each test gets its own on-disk SQLite database inside a temp directory,
//! with the embedded migrations applied, so tests exercise the same WAL
//! configuration the binary runs with and stay fully isolated from each
//! other.

use routelink::outbound::persistence::{run_migrations, DbPool, PoolConfig};
use tempfile::TempDir;

/// A migrated throwaway database; dropped (and deleted) with the value.
pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

/// Create a fresh migrated database.
pub fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("routelink-test.db");
    let pool = DbPool::new(PoolConfig::new(path.to_string_lossy()).with_max_size(2))
        .expect("pool builds");
    run_migrations(&pool).expect("migrations apply");
    TestDb { pool, _dir: dir }
}
