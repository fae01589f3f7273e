//! Review queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use wayfarer_core::{
    BookingId, ListingId, NewReview, Review, ReviewChanges, ReviewId, UserId,
};

use super::{PgStore, classify};
use crate::db::constraints::{self, violation};
use crate::db::{Entity, ReviewStore, StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    booking_id: i32,
    guest_id: i32,
    listing_id: i32,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            booking_id: BookingId::new(row.booking_id),
            guest_id: UserId::new(row.guest_id),
            listing_id: ListingId::new(row.listing_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn create_review(&self, new: NewReview) -> StoreResult<Review> {
        let mut tx = self.pool().begin().await?;

        // Lock the booking so it cannot be deleted between the check and the insert
        let listing_id: i32 =
            sqlx::query_scalar("SELECT listing_id FROM booking WHERE id = $1 FOR SHARE")
                .bind(new.booking_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::not_found(Entity::Booking, new.booking_id))?;

        if listing_id != new.listing_id.as_i32() {
            return Err(violation(constraints::REVIEW_MATCHES_BOOKING));
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO review (booking_id, guest_id, listing_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(new.booking_id.as_i32())
        .bind(new.guest_id.as_i32())
        .bind(new.listing_id.as_i32())
        .bind(new.rating)
        .bind(&new.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Review> {
        sqlx::query_as::<_, ReviewRow>("SELECT * FROM review WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool())
            .await?
            .map(Into::into)
            .ok_or_else(|| StoreError::not_found(Entity::Review, id))
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        let rows =
            sqlx::query_as::<_, ReviewRow>("SELECT * FROM review ORDER BY created_at DESC, id DESC")
                .fetch_all(self.pool())
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_review(&self, id: ReviewId, changes: ReviewChanges) -> StoreResult<Review> {
        let mut tx = self.pool().begin().await?;

        let mut review: Review =
            sqlx::query_as::<_, ReviewRow>("SELECT * FROM review WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::not_found(Entity::Review, id))?
                .into();

        changes.apply_to(&mut review);

        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            UPDATE review SET
                rating = $2,
                comment = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_review(&self, id: ReviewId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Review, id));
        }
        Ok(())
    }
}
