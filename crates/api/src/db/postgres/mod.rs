//! `PostgreSQL` store.
//!
//! Queries are built at runtime with `sqlx::query_as` and decoded into
//! private row types, which are then converted into domain records. Writes
//! pass database errors through [`classify`] so constraint failures surface
//! as [`StoreError::ConstraintViolation`] rather than opaque database errors.

mod bookings;
mod listings;
mod reviews;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::migrate::Migrator;

use super::constraints::REVIEW_MATCHES_BOOKING;
use super::{Store, StoreCounts, StoreError, StoreResult, WipeReport};

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Entity store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool. The schema must already be migrated.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a database error raised by a write onto a [`StoreError`].
///
/// - unique and check violations become [`StoreError::ConstraintViolation`]
/// - foreign key violations become [`StoreError::MissingReference`], except
///   the review/booking listing pairing, which is a constraint violation
/// - anything else stays a [`StoreError::Database`]
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or_default().to_owned();
        match db.kind() {
            ErrorKind::UniqueViolation | ErrorKind::CheckViolation => {
                return StoreError::ConstraintViolation(constraint);
            }
            ErrorKind::ForeignKeyViolation if constraint == REVIEW_MATCHES_BOOKING => {
                return StoreError::ConstraintViolation(constraint);
            }
            ErrorKind::ForeignKeyViolation => return StoreError::MissingReference(constraint),
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Build a [`StoreError::DataCorruption`] for a column that failed to parse.
pub(crate) fn corrupt(table: &str, id: i32, detail: impl std::fmt::Display) -> StoreError {
    StoreError::DataCorruption(format!("{table} {id}: {detail}"))
}

#[async_trait]
impl Store for PgStore {
    async fn wipe(&self) -> StoreResult<WipeReport> {
        let mut tx = self.pool.begin().await?;

        let reviews = sqlx::query("DELETE FROM review")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let bookings = sqlx::query("DELETE FROM booking")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let listings = sqlx::query("DELETE FROM listing")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let users = sqlx::query("DELETE FROM app_user WHERE NOT is_superuser")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let report = WipeReport {
            users,
            listings,
            bookings,
            reviews,
        };
        tracing::debug!(?report, "Database wiped");
        Ok(report)
    }

    async fn counts(&self) -> StoreResult<StoreCounts> {
        let counts = sqlx::query_as::<_, StoreCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM app_user) AS users,
                (SELECT COUNT(*) FROM listing) AS listings,
                (SELECT COUNT(*) FROM booking) AS bookings,
                (SELECT COUNT(*) FROM review) AS reviews
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
