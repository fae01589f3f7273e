//! Review representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::validation::{self, ValidationError};
use wayfarer_core::{BookingId, ListingId, Review, ReviewChanges, ReviewId, User};

use super::UserResponse;

/// A review as returned to clients. Booking and listing are rendered as IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub booking: BookingId,
    pub guest: UserResponse,
    pub listing: ListingId,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewResponse {
    #[must_use]
    pub fn new(review: Review, guest: &User) -> Self {
        Self {
            id: review.id,
            booking: review.booking_id,
            guest: guest.into(),
            listing: review.listing_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Body for `POST`. The listing is taken from the booking.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub booking_id: BookingId,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// Body for `PUT`. The booking cannot be changed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewReplace {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

impl TryFrom<ReviewReplace> for ReviewChanges {
    type Error = ValidationError;

    fn try_from(body: ReviewReplace) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: Some(validation::validate_rating(body.rating)?),
            comment: Some(body.comment),
        })
    }
}

/// Body for `PATCH`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl TryFrom<ReviewPatch> for ReviewChanges {
    type Error = ValidationError;

    fn try_from(body: ReviewPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: body.rating.map(validation::validate_rating).transpose()?,
            comment: body.comment,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_input_ignores_listing_and_guest() {
        let input: ReviewInput = serde_json::from_value(json!({
            "booking_id": 8,
            "rating": 4,
            "listing": 1,
            "guest": 2
        }))
        .unwrap();
        assert_eq!(input.booking_id, BookingId::new(8));
        assert_eq!(input.comment, "");
    }

    #[test]
    fn test_replace_validates_rating() {
        let body: ReviewReplace = serde_json::from_value(json!({"rating": 6})).unwrap();
        assert_eq!(
            ReviewChanges::try_from(body),
            Err(ValidationError::RatingOutOfRange(6))
        );
    }

    #[test]
    fn test_patch_without_rating() {
        let body: ReviewPatch = serde_json::from_value(json!({"comment": "Updated"})).unwrap();
        assert_eq!(
            ReviewChanges::try_from(body).unwrap(),
            ReviewChanges {
                rating: None,
                comment: Some("Updated".to_owned()),
            }
        );
    }

    #[test]
    fn test_patch_validates_rating() {
        let body: ReviewPatch = serde_json::from_value(json!({"rating": 0})).unwrap();
        assert!(ReviewChanges::try_from(body).is_err());
    }
}
