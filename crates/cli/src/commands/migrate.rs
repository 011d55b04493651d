//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! electronet migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `SQLite` connection string, defaults to
//!   `sqlite://electronet.db`

use tracing::info;

use electronet_directory::config::Config;
use electronet_directory::db;
use electronet_directory::error::Result;

/// Apply all pending schema migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run(config: &Config) -> Result<()> {
    info!("Connecting to directory database...");
    let pool = db::create_pool(&config.database_url).await?;

    info!("Running migrations...");
    db::run_migrations(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
