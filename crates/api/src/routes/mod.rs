//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness
//! GET    /health/ready            - Readiness (store ping)
//!
//! # Listings (writes: host only)
//! GET    /api/listings            - List, newest first
//! POST   /api/listings            - Create; actor becomes host
//! GET    /api/listings/{id}       - Detail
//! PUT    /api/listings/{id}       - Replace writable fields
//! PATCH  /api/listings/{id}       - Update present fields
//! DELETE /api/listings/{id}       - Delete with bookings and reviews
//!
//! # Bookings (writes: guest only)
//! GET    /api/bookings
//! POST   /api/bookings            - Create; actor becomes guest
//! GET    /api/bookings/{id}
//! PUT    /api/bookings/{id}
//! PATCH  /api/bookings/{id}
//! DELETE /api/bookings/{id}       - Delete with its review
//!
//! # Reviews (writes: guest only)
//! GET    /api/reviews
//! POST   /api/reviews             - Create; actor becomes guest
//! GET    /api/reviews/{id}
//! PUT    /api/reviews/{id}
//! PATCH  /api/reviews/{id}
//! DELETE /api/reviews/{id}
//! ```
//!
//! Writes identify the actor with the `x-user-id` header.

pub mod bookings;
pub mod listings;
pub mod reviews;

use std::collections::HashMap;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use wayfarer_core::{Booking, ListingId, ListingWithStats, Review, User, UserId};

use crate::db::Store;
use crate::error::Result;
use crate::representations::{BookingResponse, ListingResponse, ReviewResponse};
use crate::state::AppState;

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(listings::index).post(listings::create))
        .route(
            "/listings/{id}",
            get(listings::show)
                .put(listings::replace)
                .patch(listings::update)
                .delete(listings::destroy),
        )
        .route("/bookings", get(bookings::index).post(bookings::create))
        .route(
            "/bookings/{id}",
            get(bookings::show)
                .put(bookings::replace)
                .patch(bookings::update)
                .delete(bookings::destroy),
        )
        .route("/reviews", get(reviews::index).post(reviews::create))
        .route(
            "/reviews/{id}",
            get(reviews::show)
                .put(reviews::replace)
                .patch(reviews::update)
                .delete(reviews::destroy),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Builds nested responses, looking up each user and listing at most once
/// per request.
pub(crate) struct Render<'a> {
    store: &'a dyn Store,
    users: HashMap<UserId, User>,
    listings: HashMap<ListingId, ListingResponse>,
}

impl<'a> Render<'a> {
    pub(crate) fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            users: HashMap::new(),
            listings: HashMap::new(),
        }
    }

    /// Seed the user cache, e.g. with the actor.
    pub(crate) fn with_user(mut self, user: &User) -> Self {
        self.users.insert(user.id, user.clone());
        self
    }

    async fn user(&mut self, id: UserId) -> Result<User> {
        if let Some(user) = self.users.get(&id) {
            return Ok(user.clone());
        }
        let user = self.store.get_user(id).await?;
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub(crate) async fn listing(&mut self, row: ListingWithStats) -> Result<ListingResponse> {
        let id = row.listing.id;
        let host = self.user(row.listing.host_id).await?;
        let response = ListingResponse::new(row, &host);
        self.listings.insert(id, response.clone());
        Ok(response)
    }

    pub(crate) async fn listing_by_id(&mut self, id: ListingId) -> Result<ListingResponse> {
        if let Some(listing) = self.listings.get(&id) {
            return Ok(listing.clone());
        }
        let row = self.store.get_listing_with_stats(id).await?;
        self.listing(row).await
    }

    pub(crate) async fn booking(&mut self, booking: Booking) -> Result<BookingResponse> {
        let listing = self.listing_by_id(booking.listing_id).await?;
        let guest = self.user(booking.guest_id).await?;
        Ok(BookingResponse::new(booking, listing, &guest))
    }

    pub(crate) async fn review(&mut self, review: Review) -> Result<ReviewResponse> {
        let guest = self.user(review.guest_id).await?;
        Ok(ReviewResponse::new(review, &guest))
    }
}
