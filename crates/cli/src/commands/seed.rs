//! Demo data command.
//!
//! Destroys every listing, booking, review, and non-superuser account before
//! writing the demo set.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use wayfarer_api::config;
use wayfarer_api::db::{self, PgStore};
use wayfarer_api::seed::{self, SeedPlan};

use super::CommandError;

/// Generate a plan and either print it or write it.
///
/// # Errors
///
/// Fails if the database URL is missing or any write fails.
pub async fn run(rng_seed: Option<u64>, dry_run: bool) -> Result<(), CommandError> {
    let mut rng = rng_seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let today = Utc::now().date_naive();
    let plan = SeedPlan::generate(&mut rng, today)?;

    if dry_run {
        tracing::info!(seed = ?rng_seed, "Dry run, nothing will be written");
        for line in plan.summary() {
            tracing::info!("  {line}");
        }
        tracing::info!(
            users = plan.users.len(),
            listings = plan.listings.len(),
            bookings = plan.bookings.len(),
            reviews = plan.review_count(),
            skipped = plan.skipped,
            "Plan"
        );
        return Ok(());
    }

    let database_url = config::database_url_from_env()?;
    let pool = db::create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    tracing::warn!("Deleting all listings, bookings, reviews, and non-superuser accounts");
    let report = seed::apply(&store, plan).await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  {} users", report.counts.users);
    tracing::info!("  {} listings", report.counts.listings);
    tracing::info!("  {} bookings", report.counts.bookings);
    tracing::info!("  {} reviews", report.counts.reviews);

    Ok(())
}
