//! Listing representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wayfarer_core::validation::{self, ValidationError};
use wayfarer_core::{
    ListingChanges, ListingDetails, ListingId, ListingWithStats, Money, PropertyType, User,
};

use super::UserResponse;

/// A listing as returned to clients, with its host and rating aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingResponse {
    pub id: ListingId,
    pub host: UserResponse,
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
    pub amenities: String,
    pub is_available: bool,
    /// `null` when the listing has no reviews.
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingResponse {
    #[must_use]
    pub fn new(row: ListingWithStats, host: &User) -> Self {
        let ListingWithStats { listing, stats } = row;
        let d = listing.details;

        Self {
            id: listing.id,
            host: host.into(),
            title: d.title,
            description: d.description,
            address: d.address,
            city: d.city,
            country: d.country,
            price_per_night: d.price_per_night,
            max_guests: d.max_guests,
            bedrooms: d.bedrooms,
            bathrooms: d.bathrooms,
            property_type: d.property_type,
            amenities: d.amenities,
            is_available: d.is_available,
            average_rating: stats.average_rating,
            review_count: stats.review_count,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

const fn default_available() -> bool {
    true
}

/// Body for `POST` and `PUT`. The host always comes from the actor.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night: Decimal,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub property_type: PropertyType,
    #[serde(default)]
    pub amenities: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

impl ListingInput {
    /// Validate into listing details.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a listing rule.
    pub fn into_details(self) -> Result<ListingDetails, ValidationError> {
        let details = ListingDetails {
            price_per_night: validation::parse_price("price_per_night", self.price_per_night)?,
            title: self.title,
            description: self.description,
            address: self.address,
            city: self.city,
            country: self.country,
            max_guests: self.max_guests,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            property_type: self.property_type,
            amenities: self.amenities,
            is_available: self.is_available,
        };
        validation::validate_listing(&details)?;
        Ok(details)
    }
}

/// Body for `PATCH`. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price_per_night: Option<Decimal>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub property_type: Option<PropertyType>,
    pub amenities: Option<String>,
    pub is_available: Option<bool>,
}

impl ListingPatch {
    /// Convert into a change set, checking the price if present.
    ///
    /// The merged listing still has to pass
    /// [`validation::validate_listing`] before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Amount`] for an unusable price.
    pub fn into_changes(self) -> Result<ListingChanges, ValidationError> {
        let price_per_night = self
            .price_per_night
            .map(|amount| validation::parse_price("price_per_night", amount))
            .transpose()?;

        Ok(ListingChanges {
            title: self.title,
            description: self.description,
            address: self.address,
            city: self.city,
            country: self.country,
            price_per_night,
            max_guests: self.max_guests,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            property_type: self.property_type,
            amenities: self.amenities,
            is_available: self.is_available,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use wayfarer_core::{Email, Listing, ListingStats, UserId};

    use super::*;

    fn body() -> serde_json::Value {
        json!({
            "title": "Spacious Family House",
            "address": "654 Suburban Lane",
            "city": "Austin",
            "country": "USA",
            "price_per_night": "220.00",
            "max_guests": 10,
            "bedrooms": 5,
            "bathrooms": 3,
            "property_type": "house",
            "amenities": "WiFi, Kitchen, BBQ"
        })
    }

    #[test]
    fn test_input_defaults_and_read_only_fields_ignored() {
        let mut body = body();
        body["host"] = json!({"id": 99});
        body["average_rating"] = json!("5.00");
        body["id"] = json!(1234);

        let input: ListingInput = serde_json::from_value(body).unwrap();
        assert!(input.is_available);
        assert_eq!(input.description, "");

        let details = input.into_details().unwrap();
        assert_eq!(details.price_per_night.to_string(), "220.00");
        assert_eq!(details.property_type, PropertyType::House);
    }

    #[test]
    fn test_input_accepts_numeric_price() {
        let mut body = body();
        body["price_per_night"] = json!(99.5);
        let details = serde_json::from_value::<ListingInput>(body)
            .unwrap()
            .into_details()
            .unwrap();
        assert_eq!(details.price_per_night.to_string(), "99.50");
    }

    #[test]
    fn test_input_rejects_bad_price_and_counts() {
        let mut body = body();
        body["price_per_night"] = json!("-1.00");
        let err = serde_json::from_value::<ListingInput>(body)
            .unwrap()
            .into_details()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Amount { .. }));

        let mut body = self::body();
        body["price_per_night"] = json!("10.005");
        let err = serde_json::from_value::<ListingInput>(body)
            .unwrap()
            .into_details()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Amount { .. }));

        let mut body = self::body();
        body["bathrooms"] = json!(-2);
        let err = serde_json::from_value::<ListingInput>(body)
            .unwrap()
            .into_details()
            .unwrap_err();
        assert_eq!(err, ValidationError::Negative { field: "bathrooms" });
    }

    #[test]
    fn test_unknown_property_type_fails_to_parse() {
        let mut body = body();
        body["property_type"] = json!("castle");
        assert!(serde_json::from_value::<ListingInput>(body).is_err());
    }

    #[test]
    fn test_patch_only_sets_present_fields() {
        let patch: ListingPatch =
            serde_json::from_value(json!({"max_guests": 12, "host": 7})).unwrap();
        let changes = patch.into_changes().unwrap();
        assert_eq!(
            changes,
            ListingChanges {
                max_guests: Some(12),
                ..ListingChanges::default()
            }
        );
    }

    #[test]
    fn test_response_shape() {
        let now = Utc::now();
        let host = User {
            id: UserId::new(1),
            username: "john_doe".to_owned(),
            email: Email::parse("john@example.com").unwrap(),
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            password_hash: "hash".to_owned(),
            is_superuser: false,
            created_at: now,
            updated_at: now,
        };
        let details = serde_json::from_value::<ListingInput>(body())
            .unwrap()
            .into_details()
            .unwrap();
        let row = ListingWithStats {
            listing: Listing {
                id: ListingId::new(5),
                host_id: host.id,
                details,
                created_at: now,
                updated_at: now,
            },
            stats: ListingStats::default(),
        };

        let json = serde_json::to_value(ListingResponse::new(row, &host)).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["host"]["username"], "john_doe");
        assert!(json["host"].get("password_hash").is_none());
        assert_eq!(json["price_per_night"], "220.00");
        assert_eq!(json["property_type"], "house");
        assert_eq!(json["average_rating"], serde_json::Value::Null);
        assert_eq!(json["review_count"], 0);
    }
}
