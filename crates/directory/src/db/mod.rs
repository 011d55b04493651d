//! Database operations for the directory store.
//!
//! ## Tables
//!
//! - `units` - supply-chain participants and their supplier links
//! - `products` - catalog products
//! - `unit_products` - unit-to-product assignments
//!
//! Migrations live in `migrations/` at the workspace root and are embedded
//! into the binary at compile time.

pub mod products;
pub mod units;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::error::Result;

/// Embedded migrations, applied with [`run_migrations`].
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Enables WAL journaling, NORMAL synchronous mode, and foreign-key
/// enforcement. The database file is created when missing.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or the pool cannot connect.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a single-connection in-memory pool with migrations applied.
///
/// Used by tests and local experiments. The database vanishes when the pool
/// is dropped, and a single connection keeps every query on the same
/// in-memory instance.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply all pending migrations. Idempotent.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
