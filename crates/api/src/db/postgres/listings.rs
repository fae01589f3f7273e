//! Listing queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use wayfarer_core::{
    Listing, ListingChanges, ListingDetails, ListingId, ListingStats, ListingWithStats, Money,
    NewListing, UserId,
};

use super::{PgStore, classify, corrupt};
use crate::db::{Entity, ListingStore, StoreError, StoreResult};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i32,
    host_id: i32,
    title: String,
    description: String,
    address: String,
    city: String,
    country: String,
    price_per_night: Decimal,
    max_guests: i32,
    bedrooms: i32,
    bathrooms: i32,
    property_type: String,
    amenities: String,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let price_per_night =
            Money::new(row.price_per_night).map_err(|e| corrupt("listing", row.id, e))?;
        let property_type = row
            .property_type
            .parse()
            .map_err(|e| corrupt("listing", row.id, e))?;

        Ok(Self {
            id: ListingId::new(row.id),
            host_id: UserId::new(row.host_id),
            details: ListingDetails {
                title: row.title,
                description: row.description,
                address: row.address,
                city: row.city,
                country: row.country,
                price_per_night,
                max_guests: row.max_guests,
                bedrooms: row.bedrooms,
                bathrooms: row.bathrooms,
                property_type,
                amenities: row.amenities,
                is_available: row.is_available,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Listing joined with its review aggregate.
#[derive(Debug, sqlx::FromRow)]
struct ListingWithStatsRow {
    #[sqlx(flatten)]
    listing: ListingRow,
    average_rating: Option<Decimal>,
    review_count: i64,
}

impl TryFrom<ListingWithStatsRow> for ListingWithStats {
    type Error = StoreError;

    fn try_from(row: ListingWithStatsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            listing: row.listing.try_into()?,
            stats: ListingStats::from_aggregate(row.average_rating, row.review_count),
        })
    }
}

const SELECT_WITH_STATS: &str = r"
    SELECT
        l.*,
        AVG(r.rating) AS average_rating,
        COUNT(r.id) AS review_count
    FROM listing l
    LEFT JOIN review r ON r.listing_id = l.id
";

// =============================================================================
// Store
// =============================================================================

#[async_trait]
impl ListingStore for PgStore {
    async fn create_listing(&self, new: NewListing) -> StoreResult<Listing> {
        let d = &new.details;
        let row = sqlx::query_as::<_, ListingRow>(
            r"
            INSERT INTO listing (
                host_id, title, description, address, city, country,
                price_per_night, max_guests, bedrooms, bathrooms,
                property_type, amenities, is_available
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            ",
        )
        .bind(new.host_id.as_i32())
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.address)
        .bind(&d.city)
        .bind(&d.country)
        .bind(d.price_per_night.amount())
        .bind(d.max_guests)
        .bind(d.bedrooms)
        .bind(d.bathrooms)
        .bind(d.property_type.as_str())
        .bind(&d.amenities)
        .bind(d.is_available)
        .fetch_one(self.pool())
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn get_listing(&self, id: ListingId) -> StoreResult<Listing> {
        sqlx::query_as::<_, ListingRow>("SELECT * FROM listing WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::Listing, id))?
            .try_into()
    }

    async fn get_listing_with_stats(&self, id: ListingId) -> StoreResult<ListingWithStats> {
        let sql = format!("{SELECT_WITH_STATS} WHERE l.id = $1 GROUP BY l.id");
        sqlx::query_as::<_, ListingWithStatsRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::Listing, id))?
            .try_into()
    }

    async fn list_listings(&self) -> StoreResult<Vec<ListingWithStats>> {
        let sql = format!("{SELECT_WITH_STATS} GROUP BY l.id ORDER BY l.created_at DESC, l.id DESC");
        sqlx::query_as::<_, ListingWithStatsRow>(&sql)
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn update_listing(
        &self,
        id: ListingId,
        changes: ListingChanges,
    ) -> StoreResult<Listing> {
        let mut tx = self.pool().begin().await?;

        let mut listing: Listing =
            sqlx::query_as::<_, ListingRow>("SELECT * FROM listing WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::not_found(Entity::Listing, id))?
                .try_into()?;

        changes.apply_to(&mut listing.details);
        let d = &listing.details;

        let row = sqlx::query_as::<_, ListingRow>(
            r"
            UPDATE listing SET
                title = $2,
                description = $3,
                address = $4,
                city = $5,
                country = $6,
                price_per_night = $7,
                max_guests = $8,
                bedrooms = $9,
                bathrooms = $10,
                property_type = $11,
                amenities = $12,
                is_available = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.address)
        .bind(&d.city)
        .bind(&d.country)
        .bind(d.price_per_night.amount())
        .bind(d.max_guests)
        .bind(d.bedrooms)
        .bind(d.bathrooms)
        .bind(d.property_type.as_str())
        .bind(&d.amenities)
        .bind(d.is_available)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;
        row.try_into()
    }

    async fn delete_listing(&self, id: ListingId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM listing WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Listing, id));
        }
        Ok(())
    }
}
