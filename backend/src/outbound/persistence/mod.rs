//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never cross into the domain.
//! - **Strongly typed errors**: every database failure maps to the owning
//!   port's error enum.

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

mod diesel_entry_repository;
mod diesel_error_mapping;
mod diesel_habit_repository;
mod diesel_journal_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_entry_repository::DieselEntryRepository;
pub use diesel_habit_repository::DieselHabitRepository;
pub use diesel_journal_repository::DieselJournalRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// SQL migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying migrations at startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the migration connection.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// A migration failed to apply.
    #[error("failed to run migrations: {message}")]
    Run { message: String },
}

/// Apply any pending migrations over a short-lived synchronous connection.
///
/// Diesel's migration harness is synchronous; call this from
/// `spawn_blocking` before the async pool is put to work.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn =
        diesel::pg::PgConnection::establish(database_url).map_err(|err| {
            MigrationError::Connect {
                message: err.to_string(),
            }
        })?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| MigrationError::Run {
            message: err.to_string(),
        })
}
