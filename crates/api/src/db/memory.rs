//! In-process entity store.
//!
//! Each table is a `BTreeMap` keyed by ID behind a single `RwLock`, so every
//! write sees a consistent snapshot and cascades happen atomically. IDs are
//! handed out per table starting at 1, like `SERIAL` columns.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use wayfarer_core::{
    Booking, BookingChanges, BookingId, Listing, ListingChanges, ListingId, ListingStats,
    ListingWithStats, NewBooking, NewListing, NewReview, NewUser, Review, ReviewChanges, ReviewId,
    User, UserId,
};

use super::constraints::{self, violation};
use super::{
    BookingStore, Entity, ListingStore, ReviewStore, Store, StoreCounts, StoreError, StoreResult,
    UserStore, WipeReport,
};

/// Entity store backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    listings: BTreeMap<ListingId, Listing>,
    bookings: BTreeMap<BookingId, Booking>,
    reviews: BTreeMap<ReviewId, Review>,
    sequences: Sequences,
}

#[derive(Debug, Default)]
struct Sequences {
    user: i32,
    listing: i32,
    booking: i32,
    review: i32,
}

fn next(sequence: &mut i32) -> i32 {
    *sequence += 1;
    *sequence
}

/// Newest first; ties broken by the higher ID.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl Tables {
    fn user(&self, id: UserId) -> StoreResult<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Entity::User, id))
    }

    fn listing(&self, id: ListingId) -> StoreResult<&Listing> {
        self.listings
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Listing, id))
    }

    fn booking(&self, id: BookingId) -> StoreResult<&Booking> {
        self.bookings
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Booking, id))
    }

    fn review(&self, id: ReviewId) -> StoreResult<&Review> {
        self.reviews
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Review, id))
    }

    fn stats(&self, listing_id: ListingId) -> ListingStats {
        ListingStats::from_ratings(
            self.reviews
                .values()
                .filter(|review| review.listing_id == listing_id)
                .map(|review| review.rating),
        )
    }

    fn with_stats(&self, listing: &Listing) -> ListingWithStats {
        ListingWithStats {
            listing: listing.clone(),
            stats: self.stats(listing.id),
        }
    }

    fn remove_booking(&mut self, id: BookingId) {
        self.bookings.remove(&id);
        self.reviews.retain(|_, review| review.booking_id != id);
    }

    fn remove_listing(&mut self, id: ListingId) {
        self.listings.remove(&id);
        let bookings: Vec<_> = self
            .bookings
            .values()
            .filter(|booking| booking.listing_id == id)
            .map(|booking| booking.id)
            .collect();
        for booking_id in bookings {
            self.remove_booking(booking_id);
        }
        // Reviews also point at the listing directly
        self.reviews.retain(|_, review| review.listing_id != id);
    }

    fn remove_user(&mut self, id: UserId) {
        self.users.remove(&id);

        let listings: Vec<_> = self
            .listings
            .values()
            .filter(|listing| listing.host_id == id)
            .map(|listing| listing.id)
            .collect();
        for listing_id in listings {
            self.remove_listing(listing_id);
        }

        let bookings: Vec<_> = self
            .bookings
            .values()
            .filter(|booking| booking.guest_id == id)
            .map(|booking| booking.id)
            .collect();
        for booking_id in bookings {
            self.remove_booking(booking_id);
        }

        self.reviews.retain(|_, review| review.guest_id != id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|user| user.username == new.username) {
            return Err(violation(constraints::USERNAME_UNIQUE));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(next(&mut tables.sequences.user)),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            is_superuser: new.is_superuser,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.tables.read().await.user(id).cloned()
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.user(id)?;
        tables.remove_user(id);
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn create_listing(&self, new: NewListing) -> StoreResult<Listing> {
        constraints::check_listing_counts(&new.details)?;
        let mut tables = self.tables.write().await;
        tables.user(new.host_id)?;

        let now = Utc::now();
        let listing = Listing {
            id: ListingId::new(next(&mut tables.sequences.listing)),
            host_id: new.host_id,
            details: new.details,
            created_at: now,
            updated_at: now,
        };
        tables.listings.insert(listing.id, listing.clone());

        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> StoreResult<Listing> {
        self.tables.read().await.listing(id).cloned()
    }

    async fn get_listing_with_stats(&self, id: ListingId) -> StoreResult<ListingWithStats> {
        let tables = self.tables.read().await;
        let listing = tables.listing(id)?;
        Ok(tables.with_stats(listing))
    }

    async fn list_listings(&self) -> StoreResult<Vec<ListingWithStats>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .listings
            .values()
            .map(|listing| tables.with_stats(listing))
            .collect();
        newest_first(&mut rows, |row| {
            (row.listing.created_at, row.listing.id.as_i32())
        });
        Ok(rows)
    }

    async fn update_listing(
        &self,
        id: ListingId,
        changes: ListingChanges,
    ) -> StoreResult<Listing> {
        let mut tables = self.tables.write().await;
        let listing = tables
            .listings
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Listing, id))?;

        let mut details = listing.details.clone();
        changes.apply_to(&mut details);
        constraints::check_listing_counts(&details)?;

        listing.details = details;
        listing.updated_at = Utc::now();

        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: ListingId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.listing(id)?;
        tables.remove_listing(id);
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        constraints::check_dates(new.check_in, new.check_out)?;
        constraints::check_guests_count(new.guests_count)?;

        let mut tables = self.tables.write().await;
        tables.listing(new.listing_id)?;
        tables.user(new.guest_id)?;

        let now = Utc::now();
        let booking = Booking {
            id: BookingId::new(next(&mut tables.sequences.booking)),
            listing_id: new.listing_id,
            guest_id: new.guest_id,
            check_in: new.check_in,
            check_out: new.check_out,
            total_price: new.total_price,
            guests_count: new.guests_count,
            status: new.status,
            special_requests: new.special_requests,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> StoreResult<Booking> {
        self.tables.read().await.booking(id).cloned()
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let mut rows: Vec<_> = self.tables.read().await.bookings.values().cloned().collect();
        newest_first(&mut rows, |booking| (booking.created_at, booking.id.as_i32()));
        Ok(rows)
    }

    async fn update_booking(
        &self,
        id: BookingId,
        changes: BookingChanges,
    ) -> StoreResult<Booking> {
        if let Some(guests_count) = changes.guests_count {
            constraints::check_guests_count(guests_count)?;
        }

        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Booking, id))?;

        changes.apply_to(booking);
        booking.updated_at = Utc::now();

        Ok(booking.clone())
    }

    async fn delete_booking(&self, id: BookingId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.booking(id)?;
        tables.remove_booking(id);
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create_review(&self, new: NewReview) -> StoreResult<Review> {
        constraints::check_rating(new.rating)?;

        let mut tables = self.tables.write().await;
        let booking = tables.booking(new.booking_id)?;
        if booking.listing_id != new.listing_id {
            return Err(violation(constraints::REVIEW_MATCHES_BOOKING));
        }
        tables.user(new.guest_id)?;

        let existing = tables
            .reviews
            .values()
            .find(|review| review.booking_id == new.booking_id);
        match existing {
            Some(review) if review.guest_id == new.guest_id => {
                return Err(violation(constraints::ONE_REVIEW_PER_BOOKING));
            }
            Some(_) => return Err(violation(constraints::REVIEW_BOOKING_UNIQUE)),
            None => {}
        }

        let now = Utc::now();
        let review = Review {
            id: ReviewId::new(next(&mut tables.sequences.review)),
            booking_id: new.booking_id,
            guest_id: new.guest_id,
            listing_id: new.listing_id,
            rating: new.rating,
            comment: new.comment,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(review.id, review.clone());

        Ok(review)
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Review> {
        self.tables.read().await.review(id).cloned()
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        let mut rows: Vec<_> = self.tables.read().await.reviews.values().cloned().collect();
        newest_first(&mut rows, |review| (review.created_at, review.id.as_i32()));
        Ok(rows)
    }

    async fn update_review(&self, id: ReviewId, changes: ReviewChanges) -> StoreResult<Review> {
        if let Some(rating) = changes.rating {
            constraints::check_rating(rating)?;
        }

        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Review, id))?;

        changes.apply_to(review);
        review.updated_at = Utc::now();

        Ok(review.clone())
    }

    async fn delete_review(&self, id: ReviewId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.review(id)?;
        tables.reviews.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn wipe(&self) -> StoreResult<WipeReport> {
        let mut tables = self.tables.write().await;

        let report = WipeReport {
            reviews: tables.reviews.len() as u64,
            bookings: tables.bookings.len() as u64,
            listings: tables.listings.len() as u64,
            users: tables
                .users
                .values()
                .filter(|user| !user.is_superuser)
                .count() as u64,
        };

        tables.reviews.clear();
        tables.bookings.clear();
        tables.listings.clear();
        tables.users.retain(|_, user| user.is_superuser);

        tracing::debug!(?report, "Memory store wiped");
        Ok(report)
    }

    async fn counts(&self) -> StoreResult<StoreCounts> {
        let tables = self.tables.read().await;
        Ok(StoreCounts {
            users: tables.users.len() as i64,
            listings: tables.listings.len() as i64,
            bookings: tables.bookings.len() as i64,
            reviews: tables.reviews.len() as i64,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
