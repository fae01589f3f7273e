//! Booking representation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::{
    Booking, BookingChanges, BookingId, BookingStatus, ListingId, Money, User,
};

use super::{ListingResponse, UserResponse};

/// A booking as returned to clients. `listing` is nested in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingResponse {
    pub id: BookingId,
    pub listing: ListingResponse,
    pub guest: UserResponse,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: Money,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub special_requests: String,
    /// Nights between check-in and check-out.
    pub duration: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    #[must_use]
    pub fn new(booking: Booking, listing: ListingResponse, guest: &User) -> Self {
        Self {
            duration: booking.duration(),
            id: booking.id,
            listing,
            guest: guest.into(),
            check_in: booking.check_in,
            check_out: booking.check_out,
            total_price: booking.total_price,
            guests_count: booking.guests_count,
            status: booking.status,
            special_requests: booking.special_requests,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Body for `POST`. The guest comes from the actor and the price is computed.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: i32,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub special_requests: String,
}

/// Body for `PUT`. Dates and listing are fixed after creation, so only the
/// remaining writable fields are replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingReplace {
    pub guests_count: i32,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub special_requests: String,
}

impl From<BookingReplace> for BookingChanges {
    fn from(body: BookingReplace) -> Self {
        Self {
            guests_count: Some(body.guests_count),
            status: Some(body.status),
            special_requests: Some(body.special_requests),
        }
    }
}

/// Body for `PATCH`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingPatch {
    pub guests_count: Option<i32>,
    pub status: Option<BookingStatus>,
    pub special_requests: Option<String>,
}

impl From<BookingPatch> for BookingChanges {
    fn from(body: BookingPatch) -> Self {
        Self {
            guests_count: body.guests_count,
            status: body.status,
            special_requests: body.special_requests,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_input_ignores_server_assigned_fields() {
        let input: BookingInput = serde_json::from_value(json!({
            "listing_id": 3,
            "check_in": "2024-06-01",
            "check_out": "2024-06-04",
            "guests_count": 2,
            "total_price": "1.00",
            "guest": 42,
            "duration": 99
        }))
        .unwrap();

        assert_eq!(input.listing_id, ListingId::new(3));
        assert_eq!(input.status, BookingStatus::Pending);
        assert_eq!(input.special_requests, "");
    }

    #[test]
    fn test_input_requires_listing_id() {
        let result = serde_json::from_value::<BookingInput>(json!({
            "check_in": "2024-06-01",
            "check_out": "2024-06-04",
            "guests_count": 2
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_cannot_move_dates() {
        let body: BookingReplace = serde_json::from_value(json!({
            "guests_count": 3,
            "status": "confirmed",
            "check_in": "2030-01-01",
            "total_price": "0.00"
        }))
        .unwrap();

        assert_eq!(
            BookingChanges::from(body),
            BookingChanges {
                guests_count: Some(3),
                status: Some(BookingStatus::Confirmed),
                special_requests: Some(String::new()),
            }
        );
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let body: BookingPatch = serde_json::from_value(json!({"status": "cancelled"})).unwrap();
        assert_eq!(
            BookingChanges::from(body),
            BookingChanges {
                status: Some(BookingStatus::Cancelled),
                ..BookingChanges::default()
            }
        );
    }
}
