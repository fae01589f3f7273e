//! Database migration command.
//!
//! Applies the migrations embedded from `crates/api/migrations/`. Already
//! applied migrations are skipped.

use wayfarer_api::config;
use wayfarer_api::db::{self, postgres::MIGRATOR};

use super::CommandError;

/// Run pending migrations.
///
/// # Errors
///
/// Fails if the database URL is missing, the database is unreachable, or a
/// migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
