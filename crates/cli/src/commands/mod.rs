//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use thiserror::Error;

use wayfarer_api::config::ConfigError;
use wayfarer_api::seed::SeedError;

/// Errors a subcommand can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}
