mod courses;
mod forums;

pub use courses::PgCourseCatalog;
pub use forums::PgForumRepository;

use std::time::Duration;

use anyhow::{Context, Result};
use domains::DomainError;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

/// Schema history under `migrations/`. `run` holds a Postgres advisory lock,
/// so processes starting together against a fresh database apply it once.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a connection pool and runs pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations complete");
    Ok(pool)
}

pub(crate) fn storage_error(err: sqlx::Error) -> DomainError {
    error!(error = %err, "database operation failed");
    DomainError::Storage(err.to_string())
}
