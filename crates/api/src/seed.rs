//! Demo data generator.
//!
//! Seeding is split in two so the random part can be inspected and tested
//! without a database:
//!
//! 1. [`SeedPlan::generate`] draws bookings and reviews from a caller-supplied
//!    RNG and a fixed "today".
//! 2. [`apply`] wipes the store and writes the plan through the [`Store`]
//!    port, returning the final row counts.
//!
//! Every user gets the password [`DEMO_PASSWORD`]. Superusers survive the
//! wipe.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use wayfarer_core::validation::{self, ValidationError};
use wayfarer_core::{
    BookingStatus, Email, EmailError, ListingDetails, ListingId, Money, MoneyError, NewBooking,
    NewListing, NewReview, NewUser, PropertyType, UserId,
};

use crate::db::{Store, StoreCounts, StoreError, WipeReport};
use crate::services::password::{self, PasswordError};

/// Password shared by every seeded user.
pub const DEMO_PASSWORD: &str = "password123";

/// Booking draws per run. Draws where the guest hosts the listing are dropped.
pub const BOOKING_ATTEMPTS: usize = 15;

/// Chance that a completed booking gets a review.
pub const REVIEW_PROBABILITY: f64 = 0.7;

const BOOKING_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Confirmed,
    BookingStatus::Completed,
    BookingStatus::Pending,
];

/// Errors from generating or applying a seed plan.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid seed email: {0}")]
    Email(#[from] EmailError),

    #[error("invalid seed price: {0}")]
    Money(#[from] MoneyError),

    /// A planned row points at a user or listing that is not in the plan.
    #[error("seed plan refers to missing {0}")]
    Dangling(&'static str),
}

/// A demo account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub username: &'static str,
    pub email: Email,
    pub first_name: &'static str,
    pub last_name: &'static str,
}

/// A demo listing. `host` indexes [`SeedPlan::users`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedListing {
    pub host: usize,
    pub details: ListingDetails,
}

/// A drawn booking. `listing` and `guest` index the plan's listings and users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBooking {
    pub listing: usize,
    pub guest: usize,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub total_price: Money,
    pub review: Option<SeedReview>,
}

/// A review written by the booking's guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReview {
    pub rating: i32,
    pub comment: String,
}

/// Everything one seed run will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub users: Vec<SeedUser>,
    pub listings: Vec<SeedListing>,
    pub bookings: Vec<SeedBooking>,
    /// Draws dropped because the guest was the host.
    pub skipped: usize,
}

/// Outcome of [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub wiped: WipeReport,
    /// Row counts after seeding, including surviving superusers.
    pub counts: StoreCounts,
}

impl SeedPlan {
    /// Draw a plan.
    ///
    /// Check-in falls 1 to 30 days after `today` and stays last 1 to 14
    /// nights. Prices come from [`validation::quote_stay`].
    ///
    /// # Errors
    ///
    /// Only fails if the fixed demo data itself is invalid.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Result<Self, SeedError> {
        let users = demo_users()?;
        let listings = demo_listings()?;

        let mut bookings = Vec::new();
        let mut skipped = 0;

        for _ in 0..BOOKING_ATTEMPTS {
            let listing_index = rng.random_range(0..listings.len());
            let guest = rng.random_range(0..users.len());
            let listing = listings
                .get(listing_index)
                .ok_or(SeedError::Dangling("listing"))?;

            if guest == listing.host {
                skipped += 1;
                continue;
            }

            let check_in = today + Days::new(rng.random_range(1..=30));
            let check_out = check_in + Days::new(rng.random_range(1..=14));
            let guests_count = rng.random_range(1..=listing.details.max_guests);
            let status = BOOKING_STATUSES.choose(rng).copied().unwrap_or_default();

            let quote = validation::quote_stay(&listing.details, check_in, check_out, guests_count)?;

            let review = (status == BookingStatus::Completed
                && rng.random_bool(REVIEW_PROBABILITY))
            .then(|| SeedReview {
                rating: rng.random_range(3..=5),
                comment: format!(
                    "Great stay at {}! The host was wonderful and the place was exactly as described.",
                    listing.details.title
                ),
            });

            bookings.push(SeedBooking {
                listing: listing_index,
                guest,
                check_in,
                check_out,
                guests_count,
                status,
                total_price: quote.total_price,
                review,
            });
        }

        Ok(Self {
            users,
            listings,
            bookings,
            skipped,
        })
    }

    /// Number of reviews in the plan.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.bookings.iter().filter(|b| b.review.is_some()).count()
    }

    /// One line per planned row, for dry runs.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        let mut lines =
            Vec::with_capacity(self.users.len() + self.listings.len() + self.bookings.len());

        for user in &self.users {
            lines.push(format!("user     {} <{}>", user.username, user.email));
        }
        for listing in &self.listings {
            let host = self.users.get(listing.host).map_or("?", |u| u.username);
            lines.push(format!(
                "listing  {} ({}, {}/night, host {host})",
                listing.details.title, listing.details.city, listing.details.price_per_night
            ));
        }
        for booking in &self.bookings {
            let title = self
                .listings
                .get(booking.listing)
                .map_or("?", |l| l.details.title.as_str());
            let guest = self.users.get(booking.guest).map_or("?", |u| u.username);
            let review = booking
                .review
                .as_ref()
                .map(|r| format!(", reviewed {}/5", r.rating))
                .unwrap_or_default();
            lines.push(format!(
                "booking  {title} for {guest}: {} to {}, {} guests, {} ({}){review}",
                booking.check_in,
                booking.check_out,
                booking.guests_count,
                booking.total_price,
                booking.status
            ));
        }

        lines
    }
}

/// Wipe the store and write `plan`.
///
/// The password is hashed once and shared by all seeded users.
///
/// # Errors
///
/// Returns the first store or hashing failure. Rows written before the
/// failure are left in place.
pub async fn apply(store: &dyn Store, plan: SeedPlan) -> Result<SeedReport, SeedError> {
    let wiped = store.wipe().await?;
    tracing::info!(
        users = wiped.users,
        listings = wiped.listings,
        bookings = wiped.bookings,
        reviews = wiped.reviews,
        "Cleared existing data"
    );

    let password_hash = password::hash_password(DEMO_PASSWORD)?;

    let mut user_ids: Vec<UserId> = Vec::with_capacity(plan.users.len());
    for user in plan.users {
        let created = store
            .create_user(NewUser {
                username: user.username.to_owned(),
                email: user.email,
                first_name: user.first_name.to_owned(),
                last_name: user.last_name.to_owned(),
                password_hash: password_hash.clone(),
                is_superuser: false,
            })
            .await?;
        user_ids.push(created.id);
    }
    tracing::info!(count = user_ids.len(), "Created users");

    let mut listing_ids: Vec<ListingId> = Vec::with_capacity(plan.listings.len());
    for listing in plan.listings {
        let host_id = *user_ids.get(listing.host).ok_or(SeedError::Dangling("host"))?;
        let created = store
            .create_listing(NewListing {
                host_id,
                details: listing.details,
            })
            .await?;
        listing_ids.push(created.id);
    }
    tracing::info!(count = listing_ids.len(), "Created listings");

    let mut bookings = 0_usize;
    let mut reviews = 0_usize;
    for planned in plan.bookings {
        let listing_id = *listing_ids
            .get(planned.listing)
            .ok_or(SeedError::Dangling("listing"))?;
        let guest_id = *user_ids.get(planned.guest).ok_or(SeedError::Dangling("guest"))?;

        let booking = store
            .create_booking(NewBooking {
                listing_id,
                guest_id,
                check_in: planned.check_in,
                check_out: planned.check_out,
                total_price: planned.total_price,
                guests_count: planned.guests_count,
                status: planned.status,
                special_requests: String::new(),
            })
            .await?;
        bookings += 1;

        if let Some(review) = planned.review {
            store
                .create_review(NewReview {
                    booking_id: booking.id,
                    guest_id,
                    listing_id,
                    rating: review.rating,
                    comment: review.comment,
                })
                .await?;
            reviews += 1;
        }
    }
    tracing::info!(bookings, reviews, "Created bookings and reviews");

    let counts = store.counts().await?;
    Ok(SeedReport { wiped, counts })
}

fn demo_users() -> Result<Vec<SeedUser>, SeedError> {
    [
        ("john_doe", "john@example.com", "John", "Doe"),
        ("jane_smith", "jane@example.com", "Jane", "Smith"),
        ("mike_wilson", "mike@example.com", "Mike", "Wilson"),
        ("sarah_jones", "sarah@example.com", "Sarah", "Jones"),
    ]
    .into_iter()
    .map(|(username, email, first_name, last_name)| {
        Ok(SeedUser {
            username,
            email: Email::parse(email)?,
            first_name,
            last_name,
        })
    })
    .collect()
}

struct ListingSeed {
    title: &'static str,
    description: &'static str,
    address: &'static str,
    city: &'static str,
    price_cents: i64,
    max_guests: i32,
    bedrooms: i32,
    bathrooms: i32,
    property_type: PropertyType,
    amenities: &'static str,
    host: usize,
}

const LISTINGS: [ListingSeed; 5] = [
    ListingSeed {
        title: "Cozy Apartment in Downtown",
        description: "A beautiful cozy apartment located in the heart of downtown with amazing city views.",
        address: "123 Main Street",
        city: "New York",
        price_cents: 12_000,
        max_guests: 4,
        bedrooms: 2,
        bathrooms: 1,
        property_type: PropertyType::Apartment,
        amenities: "WiFi, Kitchen, Air Conditioning, TV",
        host: 0,
    },
    ListingSeed {
        title: "Luxury Villa with Pool",
        description: "Stunning luxury villa with private pool and garden. Perfect for family vacations.",
        address: "456 Beach Road",
        city: "Miami",
        price_cents: 35_000,
        max_guests: 8,
        bedrooms: 4,
        bathrooms: 3,
        property_type: PropertyType::Villa,
        amenities: "Pool, WiFi, Kitchen, Air Conditioning, TV, Garden",
        host: 1,
    },
    ListingSeed {
        title: "Mountain Cabin Retreat",
        description: "Peaceful cabin in the mountains with breathtaking views and hiking trails nearby.",
        address: "789 Mountain View",
        city: "Aspen",
        price_cents: 18_000,
        max_guests: 6,
        bedrooms: 3,
        bathrooms: 2,
        property_type: PropertyType::Cabin,
        amenities: "Fireplace, WiFi, Kitchen, Hot Tub",
        host: 2,
    },
    ListingSeed {
        title: "Modern City Condo",
        description: "Modern and stylish condo with great amenities and convenient location.",
        address: "321 Urban Avenue",
        city: "San Francisco",
        price_cents: 9_500,
        max_guests: 2,
        bedrooms: 1,
        bathrooms: 1,
        property_type: PropertyType::Condo,
        amenities: "WiFi, Gym, Pool, Air Conditioning",
        host: 3,
    },
    ListingSeed {
        title: "Spacious Family House",
        description: "Perfect for large families, this house offers plenty of space and a large backyard.",
        address: "654 Suburban Lane",
        city: "Austin",
        price_cents: 22_000,
        max_guests: 10,
        bedrooms: 5,
        bathrooms: 3,
        property_type: PropertyType::House,
        amenities: "WiFi, Kitchen, Air Conditioning, TV, Garden, BBQ",
        host: 0,
    },
];

fn demo_listings() -> Result<Vec<SeedListing>, SeedError> {
    LISTINGS
        .iter()
        .map(|seed| {
            let details = ListingDetails {
                title: seed.title.to_owned(),
                description: seed.description.to_owned(),
                address: seed.address.to_owned(),
                city: seed.city.to_owned(),
                country: "USA".to_owned(),
                price_per_night: Money::from_cents(seed.price_cents)?,
                max_guests: seed.max_guests,
                bedrooms: seed.bedrooms,
                bathrooms: seed.bathrooms,
                property_type: seed.property_type,
                amenities: seed.amenities.to_owned(),
                is_available: true,
            };
            validation::validate_listing(&details)?;
            Ok(SeedListing {
                host: seed.host,
                details,
            })
        })
        .collect()
}
