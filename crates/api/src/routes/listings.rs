//! Listing route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use wayfarer_core::validation;
use wayfarer_core::{ListingId, ListingStats, ListingWithStats, NewListing};

use super::Render;
use crate::error::Result;
use crate::middleware::RequireActor;
use crate::middleware::actor::ensure_owner;
use crate::representations::{ListingInput, ListingPatch, ListingResponse};
use crate::state::AppState;

/// List listings, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ListingResponse>>> {
    let rows = state.store().list_listings().await?;

    let mut render = Render::new(state.store());
    let mut listings = Vec::with_capacity(rows.len());
    for row in rows {
        listings.push(render.listing(row).await?);
    }

    Ok(Json(listings))
}

/// Show one listing with its rating aggregate.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    let row = state.store().get_listing_with_stats(id).await?;
    Ok(Json(Render::new(state.store()).listing(row).await?))
}

/// Create a listing hosted by the actor.
#[tracing::instrument(skip_all, fields(host_id = %actor.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(input): Json<ListingInput>,
) -> Result<(StatusCode, Json<ListingResponse>)> {
    let details = input.into_details()?;
    let listing = state
        .store()
        .create_listing(NewListing {
            host_id: actor.id,
            details,
        })
        .await?;

    tracing::info!(listing_id = %listing.id, "Listing created");

    let row = ListingWithStats {
        listing,
        stats: ListingStats::default(),
    };
    Ok((StatusCode::CREATED, Json(ListingResponse::new(row, &actor))))
}

/// Replace every writable field.
#[tracing::instrument(skip_all, fields(listing_id = %id))]
pub async fn replace(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ListingId>,
    Json(input): Json<ListingInput>,
) -> Result<Json<ListingResponse>> {
    let listing = state.store().get_listing(id).await?;
    ensure_owner(&actor, listing.host_id, "host")?;

    let details = input.into_details()?;
    state.store().update_listing(id, details.into()).await?;

    tracing::info!("Listing replaced");
    respond(&state, id, &actor).await
}

/// Update the fields present in the body.
#[tracing::instrument(skip_all, fields(listing_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ListingId>,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<ListingResponse>> {
    let listing = state.store().get_listing(id).await?;
    ensure_owner(&actor, listing.host_id, "host")?;

    let changes = patch.into_changes()?;
    let mut merged = listing.details;
    changes.clone().apply_to(&mut merged);
    validation::validate_listing(&merged)?;

    state.store().update_listing(id, changes).await?;

    tracing::info!("Listing updated");
    respond(&state, id, &actor).await
}

/// Delete a listing along with its bookings and their reviews.
#[tracing::instrument(skip_all, fields(listing_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ListingId>,
) -> Result<StatusCode> {
    let listing = state.store().get_listing(id).await?;
    ensure_owner(&actor, listing.host_id, "host")?;

    state.store().delete_listing(id).await?;

    tracing::info!("Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn respond(
    state: &AppState,
    id: ListingId,
    host: &wayfarer_core::User,
) -> Result<Json<ListingResponse>> {
    let row = state.store().get_listing_with_stats(id).await?;
    Ok(Json(Render::new(state.store()).with_user(host).listing(row).await?))
}
