//! Integration tests for Wayfarer.
//!
//! Each test spawns the full application on an ephemeral port, backed by a
//! fresh in-memory store, and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wayfarer-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};

use wayfarer_api::db::{MemoryStore, UserStore};
use wayfarer_api::middleware::ACTOR_HEADER;
use wayfarer_api::state::AppState;
use wayfarer_core::{Email, NewUser, User};

/// A running API server and a client pointed at it.
pub struct TestServer {
    addr: SocketAddr,
    client: Client,
    /// The server's store, for arranging data directly.
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    /// Start the application on `127.0.0.1` with an empty store.
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = wayfarer_api::app(AppState::new(store.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            addr,
            client: Client::new(),
            store,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Anonymous GET.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// A request with the actor header set to `actor`.
    #[must_use]
    pub fn request_as(&self, actor: &User, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(ACTOR_HEADER, actor.id.to_string())
    }

    pub async fn post_as(&self, actor: &User, path: &str, body: &Value) -> Response {
        self.request_as(actor, reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put_as(&self, actor: &User, path: &str, body: &Value) -> Response {
        self.request_as(actor, reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    pub async fn patch_as(&self, actor: &User, path: &str, body: &Value) -> Response {
        self.request_as(actor, reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    pub async fn delete_as(&self, actor: &User, path: &str) -> Response {
        self.request_as(actor, reqwest::Method::DELETE, path)
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Insert a regular user directly into the store.
    pub async fn create_user(&self, username: &str) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_owned(),
                email: Email::parse(&format!("{username}@example.com")).expect("valid email"),
                first_name: "Test".to_owned(),
                last_name: "User".to_owned(),
                password_hash: "not-a-real-hash".to_owned(),
                is_superuser: false,
            })
            .await
            .expect("Failed to create user")
    }

    /// Create a listing through the API and return its JSON.
    pub async fn create_listing(&self, host: &User, price: &str, max_guests: i32) -> Value {
        let response = self
            .post_as(host, "/api/listings", &listing_body(price, max_guests))
            .await;
        assert_eq!(response.status(), 201, "listing creation failed");
        response.json().await.expect("listing JSON")
    }

    /// Create a booking through the API and return its JSON.
    pub async fn create_booking(
        &self,
        guest: &User,
        listing_id: &Value,
        check_in: &str,
        check_out: &str,
        guests_count: i32,
    ) -> Value {
        let response = self
            .post_as(
                guest,
                "/api/bookings",
                &json!({
                    "listing_id": listing_id,
                    "check_in": check_in,
                    "check_out": check_out,
                    "guests_count": guests_count,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "booking creation failed");
        response.json().await.expect("booking JSON")
    }
}

/// A complete listing body.
#[must_use]
pub fn listing_body(price: &str, max_guests: i32) -> Value {
    json!({
        "title": "Cozy Apartment in Downtown",
        "description": "A beautiful cozy apartment with amazing city views.",
        "address": "123 Main Street",
        "city": "New York",
        "country": "USA",
        "price_per_night": price,
        "max_guests": max_guests,
        "bedrooms": 2,
        "bathrooms": 1,
        "property_type": "apartment",
        "amenities": "WiFi, Kitchen, Air Conditioning, TV"
    })
}
