//! Wayfarer CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! wf-cli migrate
//!
//! # Wipe non-superuser data and load demo users, listings, bookings, reviews
//! wf-cli seed
//!
//! # Reproducible run
//! wf-cli seed --seed 42
//!
//! # Print what would be written without touching the database
//! wf-cli seed --seed 42 --dry-run
//! ```
//!
//! Both commands read `WAYFARER_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(author, version, about = "Wayfarer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Replace existing data with demo data
    Seed {
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the plan instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { seed, dry_run } => commands::seed::run(seed, dry_run).await?,
    }
    Ok(())
}
