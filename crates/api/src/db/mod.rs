//! Entity store for users, listings, bookings, and reviews.
//!
//! # Adapters
//!
//! - [`MemoryStore`] - in-process tables; enforces every constraint by hand.
//!   Used for tests, demos, and when no database URL is configured.
//! - [`PgStore`] - `PostgreSQL` via sqlx. The schema in
//!   `crates/api/migrations/` declares the same constraints, and database
//!   errors are classified into [`StoreError`] variants.
//!
//! # Ownership graph
//!
//! ```text
//! User ──hosts──▶ Listing ──▶ Booking ──▶ Review
//!   └───────guest of──────────▲    ▲         │
//!   └───────wrote─────────────┼────┼─────────┘
//! ```
//!
//! Deleting any node deletes everything downstream of it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p wayfarer-cli -- migrate
//! ```

pub mod constraints;
pub mod memory;
pub mod postgres;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use wayfarer_core::{
    Booking, BookingChanges, BookingId, Listing, ListingChanges, ListingId, ListingWithStats,
    NewBooking, NewListing, NewReview, NewUser, Review, ReviewChanges, ReviewId, User, UserId,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Kinds of stored entity, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Listing,
    Booking,
    Review,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Listing => "listing",
            Self::Booking => "booking",
            Self::Review => "review",
        })
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i32 },

    /// A foreign key pointed at a row that does not exist.
    #[error("referenced row does not exist: {0}")]
    MissingReference(String),

    /// A uniqueness or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(entity: Entity, id: impl Into<i32>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Rows removed by [`Store::wipe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WipeReport {
    pub users: u64,
    pub listings: u64,
    pub bookings: u64,
    pub reviews: u64,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct StoreCounts {
    pub users: i64,
    pub listings: i64,
    pub bookings: i64,
    pub reviews: i64,
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Usernames are unique.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: UserId) -> StoreResult<User>;

    /// Delete a user along with their listings, bookings, and reviews.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
}

/// Listing persistence. Lists are ordered newest first.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create_listing(&self, new: NewListing) -> StoreResult<Listing>;

    async fn get_listing(&self, id: ListingId) -> StoreResult<Listing>;

    async fn get_listing_with_stats(&self, id: ListingId) -> StoreResult<ListingWithStats>;

    async fn list_listings(&self) -> StoreResult<Vec<ListingWithStats>>;

    async fn update_listing(&self, id: ListingId, changes: ListingChanges)
    -> StoreResult<Listing>;

    /// Delete a listing along with its bookings and their reviews.
    async fn delete_listing(&self, id: ListingId) -> StoreResult<()>;
}

/// Booking persistence. Lists are ordered newest first.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Create a booking. Rejects `check_out <= check_in` and
    /// `guests_count < 1` with [`StoreError::ConstraintViolation`].
    async fn create_booking(&self, new: NewBooking) -> StoreResult<Booking>;

    async fn get_booking(&self, id: BookingId) -> StoreResult<Booking>;

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>>;

    async fn update_booking(&self, id: BookingId, changes: BookingChanges)
    -> StoreResult<Booking>;

    /// Delete a booking along with its review.
    async fn delete_booking(&self, id: BookingId) -> StoreResult<()>;
}

/// Review persistence. Lists are ordered newest first.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Create a review. Rejects a rating outside `1..=5`, a second review for
    /// the same booking, and a second review by the same guest for the same
    /// booking with [`StoreError::ConstraintViolation`].
    async fn create_review(&self, new: NewReview) -> StoreResult<Review>;

    async fn get_review(&self, id: ReviewId) -> StoreResult<Review>;

    async fn list_reviews(&self) -> StoreResult<Vec<Review>>;

    async fn update_review(&self, id: ReviewId, changes: ReviewChanges) -> StoreResult<Review>;

    async fn delete_review(&self, id: ReviewId) -> StoreResult<()>;
}

/// The full entity store.
#[async_trait]
pub trait Store: UserStore + ListingStore + BookingStore + ReviewStore {
    /// Delete every review, booking, and listing, and every user that is not
    /// a superuser. Irreversible.
    async fn wipe(&self) -> StoreResult<WipeReport>;

    async fn counts(&self) -> StoreResult<StoreCounts>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
