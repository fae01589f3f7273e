//! Cross-field business rules applied before anything is written.
//!
//! The store re-checks the invariants it can see on its own (date order,
//! rating bounds, uniqueness), but the rules here need more context: the
//! listing a booking is for, or which fields a client actually supplied.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Listing, ListingDetails};
use crate::types::{Money, MoneyError};

/// Allowed review ratings.
pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

/// Column widths for listing text fields.
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_ADDRESS_LENGTH: usize = 255;
pub const MAX_PLACE_LENGTH: usize = 100;

/// A business-rule violation caught before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    #[error("Number of guests exceeds maximum allowed ({max})")]
    TooManyGuests { max: i32, requested: i32 },

    #[error("Number of guests must be at least 1")]
    NoGuests,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange(i32),

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("{field} cannot be blank")]
    Blank { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field}: {source}")]
    Amount {
        field: &'static str,
        #[source]
        source: MoneyError,
    },
}

/// Price and length of a validated stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingQuote {
    pub nights: u32,
    pub total_price: Money,
}

/// Whole days between check-in and check-out. Negative if the dates are
/// reversed.
#[must_use]
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Validate a new booking against its listing and price it.
///
/// Rules, in order:
/// 1. `check_in` must be strictly before `check_out`
/// 2. `guests_count` must be at least 1 and at most `listing.max_guests`
///
/// `total_price = nights * price_per_night`.
///
/// # Errors
///
/// Returns the first rule that fails, or [`ValidationError::Amount`] if the
/// total does not fit in a price column.
///
/// # Example
///
/// ```
/// # use chrono::{NaiveDate, Utc};
/// # use wayfarer_core::*;
/// # let listing = Listing {
/// #     id: ListingId::new(1),
/// #     host_id: UserId::new(1),
/// #     details: ListingDetails {
/// #         title: "Loft".into(), description: String::new(), address: String::new(),
/// #         city: String::new(), country: String::new(),
/// #         price_per_night: Money::from_cents(10_000).unwrap(),
/// #         max_guests: 4, bedrooms: 1, bathrooms: 1,
/// #         property_type: PropertyType::Apartment, amenities: String::new(),
/// #         is_available: true,
/// #     },
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// let check_in = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let check_out = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
///
/// let quote = validation::quote_booking(&listing, check_in, check_out, 4).unwrap();
/// assert_eq!(quote.nights, 3);
/// assert_eq!(quote.total_price.to_string(), "300.00");
///
/// assert!(validation::quote_booking(&listing, check_in, check_out, 5).is_err());
/// ```
pub fn quote_booking(
    listing: &Listing,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests_count: i32,
) -> Result<BookingQuote, ValidationError> {
    quote_stay(&listing.details, check_in, check_out, guests_count)
}

/// [`quote_booking`] for a listing that has not been stored yet.
///
/// # Errors
///
/// Same as [`quote_booking`].
pub fn quote_stay(
    details: &ListingDetails,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests_count: i32,
) -> Result<BookingQuote, ValidationError> {
    if check_in >= check_out {
        return Err(ValidationError::CheckOutNotAfterCheckIn);
    }

    check_capacity(details.max_guests, guests_count)?;

    let nights = u32::try_from(nights(check_in, check_out)).map_err(|_| {
        ValidationError::Amount {
            field: "total_price",
            source: MoneyError::TooLarge {
                max: Money::MAX_DIGITS,
            },
        }
    })?;

    let total_price = details
        .price_per_night
        .times(nights)
        .map_err(|source| ValidationError::Amount {
            field: "total_price",
            source,
        })?;

    Ok(BookingQuote {
        nights,
        total_price,
    })
}

/// Check a guest count against a listing's capacity.
///
/// # Errors
///
/// Returns [`ValidationError::NoGuests`] below 1 and
/// [`ValidationError::TooManyGuests`] above `max_guests`.
pub fn validate_guest_count(listing: &Listing, guests_count: i32) -> Result<(), ValidationError> {
    check_capacity(listing.details.max_guests, guests_count)
}

fn check_capacity(max: i32, guests_count: i32) -> Result<(), ValidationError> {
    if guests_count < 1 {
        return Err(ValidationError::NoGuests);
    }

    if guests_count > max {
        return Err(ValidationError::TooManyGuests {
            max,
            requested: guests_count,
        });
    }

    Ok(())
}

/// Check a review rating.
///
/// # Errors
///
/// Returns [`ValidationError::RatingOutOfRange`] outside `1..=5`.
pub fn validate_rating(rating: i32) -> Result<i32, ValidationError> {
    if RATING_RANGE.contains(&rating) {
        Ok(rating)
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Convert a client-supplied price into [`Money`].
///
/// # Errors
///
/// Returns [`ValidationError::Amount`] naming `field` if the amount is
/// negative, too precise, or too large.
pub fn parse_price(field: &'static str, amount: Decimal) -> Result<Money, ValidationError> {
    Money::new(amount).map_err(|source| ValidationError::Amount { field, source })
}

/// Validate the host-editable fields of a listing.
///
/// # Errors
///
/// Returns the first field that is blank, too long, or negative.
pub fn validate_listing(details: &ListingDetails) -> Result<(), ValidationError> {
    check_text("title", &details.title, MAX_TITLE_LENGTH)?;
    check_text("address", &details.address, MAX_ADDRESS_LENGTH)?;
    check_text("city", &details.city, MAX_PLACE_LENGTH)?;
    check_text("country", &details.country, MAX_PLACE_LENGTH)?;

    for (field, value) in [
        ("max_guests", details.max_guests),
        ("bedrooms", details.bedrooms),
        ("bathrooms", details.bathrooms),
    ] {
        if value < 0 {
            return Err(ValidationError::Negative { field });
        }
    }

    Ok(())
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
