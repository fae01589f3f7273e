//! Booking queries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use wayfarer_core::{
    Booking, BookingChanges, BookingId, ListingId, Money, NewBooking, UserId,
};

use super::{PgStore, classify, corrupt};
use crate::db::{BookingStore, Entity, StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i32,
    listing_id: i32,
    guest_id: i32,
    check_in: NaiveDate,
    check_out: NaiveDate,
    total_price: Decimal,
    guests_count: i32,
    status: String,
    special_requests: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let total_price = Money::new(row.total_price).map_err(|e| corrupt("booking", row.id, e))?;
        let status = row.status.parse().map_err(|e| corrupt("booking", row.id, e))?;

        Ok(Self {
            id: BookingId::new(row.id),
            listing_id: ListingId::new(row.listing_id),
            guest_id: UserId::new(row.guest_id),
            check_in: row.check_in,
            check_out: row.check_out,
            total_price,
            guests_count: row.guests_count,
            status,
            special_requests: row.special_requests,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn create_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            r"
            INSERT INTO booking (
                listing_id, guest_id, check_in, check_out, total_price,
                guests_count, status, special_requests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(new.listing_id.as_i32())
        .bind(new.guest_id.as_i32())
        .bind(new.check_in)
        .bind(new.check_out)
        .bind(new.total_price.amount())
        .bind(new.guests_count)
        .bind(new.status.as_str())
        .bind(&new.special_requests)
        .fetch_one(self.pool())
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn get_booking(&self, id: BookingId) -> StoreResult<Booking> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM booking WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::Booking, id))?
            .try_into()
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM booking ORDER BY created_at DESC, id DESC")
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn update_booking(
        &self,
        id: BookingId,
        changes: BookingChanges,
    ) -> StoreResult<Booking> {
        let mut tx = self.pool().begin().await?;

        let mut booking: Booking =
            sqlx::query_as::<_, BookingRow>("SELECT * FROM booking WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::not_found(Entity::Booking, id))?
                .try_into()?;

        changes.apply_to(&mut booking);

        let row = sqlx::query_as::<_, BookingRow>(
            r"
            UPDATE booking SET
                guests_count = $2,
                status = $3,
                special_requests = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(booking.guests_count)
        .bind(booking.status.as_str())
        .bind(&booking.special_requests)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;
        row.try_into()
    }

    async fn delete_booking(&self, id: BookingId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM booking WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Booking, id));
        }
        Ok(())
    }
}
