//! Persistence. Every function that touches tenant data takes the acting
//! [`TenantContext`](crate::tenant::TenantContext); listings filter on its
//! café and single-row lookups go through `claim`.

use std::str::FromStr;
use std::time::Duration;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::errors::AppError;

pub mod caffes;
pub mod calendar;
pub mod cash;
pub mod employees;
pub mod hours;
pub mod reports;
pub mod stencils;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens (creating if needed) the database at `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await?;
    log::info!("Connected to {}", database_url);
    Ok(pool)
}

/// Private in-memory database. A single connection that never expires, so
/// every query sees the same data.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrated successfully");
    Ok(())
}
