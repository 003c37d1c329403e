//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresJournalRepository` - journals, transcript messages and images
//! - `PostgresErrorLedger` - topics, user errors, learning points and history
//! - `PostgresContextProfileRepository` - per-user context profiles

mod journal_repository;
mod ledger_repository;
mod profile_repository;

pub use journal_repository::PostgresJournalRepository;
pub use ledger_repository::PostgresErrorLedger;
pub use profile_repository::PostgresContextProfileRepository;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::Row;

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool and applies the embedded migrations when asked to.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database("Failed to connect to database", e))?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DomainError::database("Failed to run migrations", e))?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

/// Reads a typed column, mapping decode failures to a database error.
pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", name), e))
}
