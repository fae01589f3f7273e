//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use wayfarer_core::validation;
use wayfarer_core::{NewReview, ReviewChanges, ReviewId, User};

use super::Render;
use crate::error::Result;
use crate::middleware::RequireActor;
use crate::middleware::actor::ensure_owner;
use crate::representations::{ReviewInput, ReviewPatch, ReviewReplace, ReviewResponse};
use crate::state::AppState;

/// List reviews, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ReviewResponse>>> {
    let reviews = state.store().list_reviews().await?;

    let mut render = Render::new(state.store());
    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        out.push(render.review(review).await?);
    }

    Ok(Json(out))
}

/// Show one review.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<ReviewResponse>> {
    let review = state.store().get_review(id).await?;
    Ok(Json(Render::new(state.store()).review(review).await?))
}

/// Review a booking as the actor. The listing is copied from the booking.
#[tracing::instrument(skip_all, fields(guest_id = %actor.id, booking_id = %input.booking_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    let rating = validation::validate_rating(input.rating)?;
    let booking = state.store().get_booking(input.booking_id).await?;

    let review = state
        .store()
        .create_review(NewReview {
            booking_id: booking.id,
            guest_id: actor.id,
            listing_id: booking.listing_id,
            rating,
            comment: input.comment,
        })
        .await?;

    tracing::info!(review_id = %review.id, rating, "Review created");
    Ok((StatusCode::CREATED, Json(ReviewResponse::new(review, &actor))))
}

/// Replace rating and comment.
#[tracing::instrument(skip_all, fields(review_id = %id))]
pub async fn replace(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewReplace>,
) -> Result<Json<ReviewResponse>> {
    apply(&state, &actor, id, body.try_into()?).await
}

/// Update the fields present in the body.
#[tracing::instrument(skip_all, fields(review_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewPatch>,
) -> Result<Json<ReviewResponse>> {
    apply(&state, &actor, id, body.try_into()?).await
}

/// Delete a review.
#[tracing::instrument(skip_all, fields(review_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    let review = state.store().get_review(id).await?;
    ensure_owner(&actor, review.guest_id, "guest")?;

    state.store().delete_review(id).await?;

    tracing::info!("Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply(
    state: &AppState,
    actor: &User,
    id: ReviewId,
    changes: ReviewChanges,
) -> Result<Json<ReviewResponse>> {
    let review = state.store().get_review(id).await?;
    ensure_owner(actor, review.guest_id, "guest")?;

    let review = state.store().update_review(id, changes).await?;
    tracing::info!("Review updated");

    Ok(Json(ReviewResponse::new(review, actor)))
}
