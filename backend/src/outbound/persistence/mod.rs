//! Diesel/SQLite persistence adapters.
//!
//! One adapter per domain port, all sharing a tuned [`DbPool`]. The schema
//! is created by the embedded migrations, run once at startup via
//! [`run_migrations`]; a failure there aborts the process rather than
//! continuing against a stale schema.

pub mod models;
pub mod pool;
pub mod schema;

mod diesel_calendar_repository;
mod diesel_conversation_repository;
mod diesel_message_repository;
mod diesel_rider_repository;
mod diesel_route_repository;
mod diesel_user_repository;

pub use diesel_calendar_repository::DieselCalendarRepository;
pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_rider_repository::DieselRiderRepository;
pub use diesel_route_repository::DieselRouteRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use tracing::info;

/// Schema migrations embedded at build time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A startup migration failure. Fatal by design.
#[derive(Debug, Error)]
pub enum MigrationFailure {
    /// No connection could be obtained to run migrations on.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// A migration failed to apply.
    #[error("schema migration failed: {0}")]
    Migration(String),
}

/// Apply any pending schema migrations.
///
/// # Errors
///
/// Returns [`MigrationFailure`] when a connection cannot be obtained or a
/// migration does not apply cleanly; callers are expected to abort startup.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationFailure> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationFailure::Migration(err.to_string()))?;
    for version in applied {
        info!(%version, "applied schema migration");
    }
    Ok(())
}
