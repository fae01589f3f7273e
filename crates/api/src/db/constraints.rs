//! Row-level constraints checked by the store itself.
//!
//! These mirror the `CHECK` constraints in the migrations, so a write that
//! skipped the validation layer is still refused, with the same constraint
//! names on both adapters.

use chrono::NaiveDate;

use wayfarer_core::ListingDetails;
use wayfarer_core::validation::RATING_RANGE;

use super::StoreError;

pub const CHECK_OUT_AFTER_CHECK_IN: &str = "check_out_after_check_in";
pub const GUESTS_COUNT_POSITIVE: &str = "guests_count_positive";
pub const LISTING_COUNTS_NON_NEGATIVE: &str = "listing_counts_non_negative";
pub const RATING_BETWEEN_ONE_AND_FIVE: &str = "rating_between_one_and_five";
pub const ONE_REVIEW_PER_BOOKING: &str = "one_review_per_booking";
pub const REVIEW_BOOKING_UNIQUE: &str = "review_booking_id_key";
pub const REVIEW_MATCHES_BOOKING: &str = "review_listing_matches_booking";
pub const USERNAME_UNIQUE: &str = "app_user_username_key";

/// `check_out > check_in`
pub fn check_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), StoreError> {
    if check_out > check_in {
        Ok(())
    } else {
        Err(violation(CHECK_OUT_AFTER_CHECK_IN))
    }
}

/// `guests_count > 0`
pub fn check_guests_count(guests_count: i32) -> Result<(), StoreError> {
    if guests_count > 0 {
        Ok(())
    } else {
        Err(violation(GUESTS_COUNT_POSITIVE))
    }
}

/// `max_guests >= 0 AND bedrooms >= 0 AND bathrooms >= 0`
pub fn check_listing_counts(details: &ListingDetails) -> Result<(), StoreError> {
    if details.max_guests >= 0 && details.bedrooms >= 0 && details.bathrooms >= 0 {
        Ok(())
    } else {
        Err(violation(LISTING_COUNTS_NON_NEGATIVE))
    }
}

/// `rating BETWEEN 1 AND 5`
pub fn check_rating(rating: i32) -> Result<(), StoreError> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(violation(RATING_BETWEEN_ONE_AND_FIVE))
    }
}

/// Build a [`StoreError::ConstraintViolation`] for a named constraint.
#[must_use]
pub fn violation(constraint: &str) -> StoreError {
    StoreError::ConstraintViolation(constraint.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap_or_default()
    }

    #[test]
    fn test_check_dates() {
        assert!(check_dates(date(1), date(2)).is_ok());
        assert!(matches!(
            check_dates(date(2), date(2)),
            Err(StoreError::ConstraintViolation(name)) if name == CHECK_OUT_AFTER_CHECK_IN
        ));
        assert!(check_dates(date(3), date(2)).is_err());
    }

    #[test]
    fn test_check_rating() {
        assert!(check_rating(3).is_ok());
        assert!(check_rating(0).is_err());
        assert!(check_rating(6).is_err());
    }

    #[test]
    fn test_check_guests_count() {
        assert!(check_guests_count(1).is_ok());
        assert!(check_guests_count(0).is_err());
    }

    #[test]
    fn test_check_listing_counts() {
        let mut details = ListingDetails {
            title: "Cabin".to_owned(),
            description: String::new(),
            address: "1 Pine Way".to_owned(),
            city: "Aspen".to_owned(),
            country: "USA".to_owned(),
            price_per_night: wayfarer_core::Money::from_cents(10_000).unwrap(),
            max_guests: 0,
            bedrooms: 0,
            bathrooms: 0,
            property_type: wayfarer_core::PropertyType::Cabin,
            amenities: String::new(),
            is_available: true,
        };
        assert!(check_listing_counts(&details).is_ok());

        details.bathrooms = -1;
        assert!(matches!(
            check_listing_counts(&details),
            Err(StoreError::ConstraintViolation(name)) if name == LISTING_COUNTS_NON_NEGATIVE
        ));
    }
}
