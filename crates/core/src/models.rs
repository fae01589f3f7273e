//! Entity records and the change sets used to write them.
//!
//! These are the validated domain shapes shared by every store
//! implementation. Wire representations live in the API crate and convert
//! to and from these types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{
    BookingId, BookingStatus, Email, ListingId, Money, PropertyType, ReviewId, UserId,
};

// =============================================================================
// Users
// =============================================================================

/// A marketplace account. Hosts and guests are both plain users.
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Privileged accounts survive a seed wipe.
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_superuser: bool,
}

// =============================================================================
// Listings
// =============================================================================

/// The host-editable part of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDetails {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night: Money,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub property_type: PropertyType,
    /// Comma-separated amenity tags, e.g. `"WiFi, Kitchen, Pool"`.
    pub amenities: String,
    pub is_available: bool,
}

impl ListingDetails {
    /// Iterate over the individual amenity tags, trimmed, skipping blanks.
    pub fn amenity_tags(&self) -> impl Iterator<Item = &str> {
        self.amenities
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

/// A published property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: ListingId,
    pub host_id: UserId,
    pub details: ListingDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub host_id: UserId,
    pub details: ListingDetails,
}

/// A partial update to a listing. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price_per_night: Option<Money>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub property_type: Option<PropertyType>,
    pub amenities: Option<String>,
    pub is_available: Option<bool>,
}

impl ListingChanges {
    /// Overwrite every field in `details` that this change set provides.
    pub fn apply_to(self, details: &mut ListingDetails) {
        let Self {
            title,
            description,
            address,
            city,
            country,
            price_per_night,
            max_guests,
            bedrooms,
            bathrooms,
            property_type,
            amenities,
            is_available,
        } = self;

        set(&mut details.title, title);
        set(&mut details.description, description);
        set(&mut details.address, address);
        set(&mut details.city, city);
        set(&mut details.country, country);
        set(&mut details.price_per_night, price_per_night);
        set(&mut details.max_guests, max_guests);
        set(&mut details.bedrooms, bedrooms);
        set(&mut details.bathrooms, bathrooms);
        set(&mut details.property_type, property_type);
        set(&mut details.amenities, amenities);
        set(&mut details.is_available, is_available);
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl From<ListingDetails> for ListingChanges {
    fn from(details: ListingDetails) -> Self {
        Self {
            title: Some(details.title),
            description: Some(details.description),
            address: Some(details.address),
            city: Some(details.city),
            country: Some(details.country),
            price_per_night: Some(details.price_per_night),
            max_guests: Some(details.max_guests),
            bedrooms: Some(details.bedrooms),
            bathrooms: Some(details.bathrooms),
            property_type: Some(details.property_type),
            amenities: Some(details.amenities),
            is_available: Some(details.is_available),
        }
    }
}

/// Rating aggregate for one listing. Never stored; computed on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// Mean rating rounded to two places, `None` when there are no reviews.
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
}

impl ListingStats {
    /// Build stats from an aggregate computed elsewhere (e.g. SQL `AVG`).
    #[must_use]
    pub fn from_aggregate(average: Option<Decimal>, review_count: i64) -> Self {
        if review_count == 0 {
            return Self::default();
        }

        Self {
            average_rating: average.map(round_rating),
            review_count,
        }
    }

    /// Compute stats from individual ratings.
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = i32>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_i64, 0_i64), |(sum, count), rating| {
                (sum + i64::from(rating), count + 1)
            });

        if count == 0 {
            return Self::default();
        }

        Self {
            average_rating: Some(round_rating(Decimal::from(sum) / Decimal::from(count))),
            review_count: count,
        }
    }
}

fn round_rating(average: Decimal) -> Decimal {
    let mut rounded = average.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// A listing together with its rating aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingWithStats {
    pub listing: Listing,
    pub stats: ListingStats,
}

// =============================================================================
// Bookings
// =============================================================================

/// A guest's reservation of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub listing_id: ListingId,
    pub guest_id: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Fixed at creation from the nightly price; never recomputed.
    pub total_price: Money,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub special_requests: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Length of the stay in whole days.
    #[must_use]
    pub fn duration(&self) -> i64 {
        crate::validation::nights(self.check_in, self.check_out)
    }
}

/// Input for creating a booking. `total_price` comes from
/// [`crate::validation::quote_booking`], never from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub listing_id: ListingId,
    pub guest_id: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: Money,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub special_requests: String,
}

/// A partial update to a booking.
///
/// Dates, listing and price are fixed once a booking exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingChanges {
    pub guests_count: Option<i32>,
    pub status: Option<BookingStatus>,
    pub special_requests: Option<String>,
}

impl BookingChanges {
    /// Overwrite every field in `booking` that this change set provides.
    pub fn apply_to(self, booking: &mut Booking) {
        set(&mut booking.guests_count, self.guests_count);
        set(&mut booking.status, self.status);
        set(&mut booking.special_requests, self.special_requests);
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A guest's review of a stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub guest_id: UserId,
    /// Copied from the booking when the review is written.
    pub listing_id: ListingId,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub booking_id: BookingId,
    pub guest_id: UserId,
    pub listing_id: ListingId,
    pub rating: i32,
    pub comment: String,
}

/// A partial update to a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl ReviewChanges {
    /// Overwrite every field in `review` that this change set provides.
    pub fn apply_to(self, review: &mut Review) {
        set(&mut review.rating, self.rating);
        set(&mut review.comment, self.comment);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> ListingDetails {
        ListingDetails {
            title: "Mountain Cabin Retreat".to_owned(),
            description: "Quiet cabin".to_owned(),
            address: "789 Mountain View".to_owned(),
            city: "Aspen".to_owned(),
            country: "USA".to_owned(),
            price_per_night: Money::from_cents(18_000).unwrap(),
            max_guests: 6,
            bedrooms: 3,
            bathrooms: 2,
            property_type: PropertyType::Cabin,
            amenities: "Fireplace, WiFi,, Hot Tub ".to_owned(),
            is_available: true,
        }
    }

    #[test]
    fn test_amenity_tags_trims_and_skips_blanks() {
        let details = details();
        let tags: Vec<_> = details.amenity_tags().collect();
        assert_eq!(tags, ["Fireplace", "WiFi", "Hot Tub"]);
    }

    #[test]
    fn test_listing_changes_only_touch_provided_fields() {
        let mut details = details();
        ListingChanges {
            max_guests: Some(8),
            is_available: Some(false),
            ..ListingChanges::default()
        }
        .apply_to(&mut details);

        assert_eq!(details.max_guests, 8);
        assert!(!details.is_available);
        assert_eq!(details.title, "Mountain Cabin Retreat");
    }

    #[test]
    fn test_stats_without_reviews_has_no_average() {
        let stats = ListingStats::from_ratings([]);
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.review_count, 0);

        assert_eq!(
            ListingStats::from_aggregate(Some(Decimal::ZERO), 0),
            ListingStats::default()
        );
    }

    #[test]
    fn test_stats_rounds_to_two_places() {
        let stats = ListingStats::from_ratings([5, 4, 4]);
        assert_eq!(stats.review_count, 3);
        assert_eq!(stats.average_rating.unwrap().to_string(), "4.33");

        let stats = ListingStats::from_ratings([5, 4]);
        assert_eq!(stats.average_rating.unwrap().to_string(), "4.50");
    }

    #[test]
    fn test_stats_from_aggregate_rounds_half_away_from_zero() {
        // 3.665 -> 3.67
        let stats = ListingStats::from_aggregate(Some(Decimal::new(3_665, 3)), 3);
        assert_eq!(stats.average_rating.unwrap().to_string(), "3.67");
    }
}
