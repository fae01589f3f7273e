//! Booking route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use wayfarer_core::validation;
use wayfarer_core::{Booking, BookingChanges, BookingId, NewBooking, User};

use super::Render;
use crate::error::Result;
use crate::middleware::RequireActor;
use crate::middleware::actor::ensure_owner;
use crate::representations::{BookingInput, BookingPatch, BookingReplace, BookingResponse};
use crate::state::AppState;

/// List bookings, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<BookingResponse>>> {
    let bookings = state.store().list_bookings().await?;

    let mut render = Render::new(state.store());
    let mut out = Vec::with_capacity(bookings.len());
    for booking in bookings {
        out.push(render.booking(booking).await?);
    }

    Ok(Json(out))
}

/// Show one booking with its listing nested.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<BookingResponse>> {
    let booking = state.store().get_booking(id).await?;
    Ok(Json(Render::new(state.store()).booking(booking).await?))
}

/// Book a listing for the actor.
///
/// The dates and guest count are checked against the listing and the total
/// price is computed here; clients cannot supply it.
#[tracing::instrument(skip_all, fields(guest_id = %actor.id, listing_id = %input.listing_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(input): Json<BookingInput>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let listing = state.store().get_listing(input.listing_id).await?;
    let quote =
        validation::quote_booking(&listing, input.check_in, input.check_out, input.guests_count)?;

    let booking = state
        .store()
        .create_booking(NewBooking {
            listing_id: listing.id,
            guest_id: actor.id,
            check_in: input.check_in,
            check_out: input.check_out,
            total_price: quote.total_price,
            guests_count: input.guests_count,
            status: input.status,
            special_requests: input.special_requests,
        })
        .await?;

    tracing::info!(
        booking_id = %booking.id,
        nights = quote.nights,
        total_price = %booking.total_price,
        "Booking created"
    );

    let response = Render::new(state.store())
        .with_user(&actor)
        .booking(booking)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Replace the writable fields of a booking.
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn replace(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<BookingId>,
    Json(body): Json<BookingReplace>,
) -> Result<Json<BookingResponse>> {
    apply(&state, &actor, id, body.into()).await
}

/// Update the fields present in the body.
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<BookingId>,
    Json(body): Json<BookingPatch>,
) -> Result<Json<BookingResponse>> {
    apply(&state, &actor, id, body.into()).await
}

/// Delete a booking along with its review.
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<BookingId>,
) -> Result<StatusCode> {
    let booking = state.store().get_booking(id).await?;
    ensure_owner(&actor, booking.guest_id, "guest")?;

    state.store().delete_booking(id).await?;

    tracing::info!("Booking deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply(
    state: &AppState,
    actor: &User,
    id: BookingId,
    changes: BookingChanges,
) -> Result<Json<BookingResponse>> {
    let booking: Booking = state.store().get_booking(id).await?;
    ensure_owner(actor, booking.guest_id, "guest")?;

    if let Some(guests_count) = changes.guests_count {
        let listing = state.store().get_listing(booking.listing_id).await?;
        validation::validate_guest_count(&listing, guests_count)?;
    }

    let booking = state.store().update_booking(id, changes).await?;
    tracing::info!(status = %booking.status, "Booking updated");

    let response = Render::new(state.store())
        .with_user(actor)
        .booking(booking)
        .await?;
    Ok(Json(response))
}
