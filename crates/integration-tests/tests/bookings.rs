//! Booking endpoints over HTTP.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use wayfarer_integration_tests::TestServer;

#[tokio::test]
async fn test_booking_price_is_derived() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;

    let response = server
        .post_as(
            &guest,
            "/api/bookings",
            &json!({
                "listing_id": listing["id"],
                "check_in": "2030-06-01",
                "check_out": "2030-06-04",
                "guests_count": 4,
                "total_price": "1.00",
                "guest": host.id.as_i32(),
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["total_price"], "300.00");
    assert_eq!(booking["duration"], 3);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["special_requests"], "");
    assert_eq!(booking["guest"]["username"], "jane_smith");
    assert_eq!(booking["listing"]["id"], listing["id"]);
    assert_eq!(booking["listing"]["host"]["username"], "john_doe");
}

#[tokio::test]
async fn test_booking_over_capacity_rejected() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;

    let response = server
        .post_as(
            &guest,
            "/api/bookings",
            &json!({
                "listing_id": listing["id"],
                "check_in": "2030-06-01",
                "check_out": "2030-06-04",
                "guests_count": 5,
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Number of guests exceeds maximum allowed (4)");

    let bookings: Vec<Value> = server.get("/api/bookings").await.json().await.unwrap();
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn test_booking_dates_must_be_ordered() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;

    for (check_in, check_out) in [("2030-06-04", "2030-06-01"), ("2030-06-01", "2030-06-01")] {
        let response = server
            .post_as(
                &guest,
                "/api/bookings",
                &json!({
                    "listing_id": listing["id"],
                    "check_in": check_in,
                    "check_out": check_out,
                    "guests_count": 2,
                }),
            )
            .await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Check-out date must be after check-in date");
    }
}

#[tokio::test]
async fn test_booking_unknown_listing() {
    let server = TestServer::spawn().await;
    let guest = server.create_user("jane_smith").await;

    let response = server
        .post_as(
            &guest,
            "/api/bookings",
            &json!({
                "listing_id": 77,
                "check_in": "2030-06-01",
                "check_out": "2030-06-02",
                "guests_count": 1,
            }),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_guest_updates_booking() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-04", 2)
        .await;
    let path = format!("/api/bookings/{}", booking["id"]);

    let response = server
        .patch_as(&host, &path, &json!({"status": "cancelled"}))
        .await;
    assert_eq!(response.status(), 403);

    let response = server
        .patch_as(&guest, &path, &json!({"guests_count": 5}))
        .await;
    assert_eq!(response.status(), 400);

    let response = server
        .patch_as(
            &guest,
            &path,
            &json!({"status": "confirmed", "check_out": "2030-07-01", "total_price": "0.00"}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "confirmed");
    assert_eq!(updated["check_out"], "2030-06-04");
    assert_eq!(updated["total_price"], "300.00");
    assert_eq!(updated["guests_count"], 2);

    let response = server
        .put_as(
            &guest,
            &path,
            &json!({"guests_count": 3, "special_requests": "Late arrival"}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let replaced: Value = response.json().await.unwrap();
    assert_eq!(replaced["guests_count"], 3);
    assert_eq!(replaced["status"], "pending");
    assert_eq!(replaced["special_requests"], "Late arrival");
}

#[tokio::test]
async fn test_unknown_status_rejected() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-04", 2)
        .await;

    let response = server
        .patch_as(
            &guest,
            &format!("/api/bookings/{}", booking["id"]),
            &json!({"status": "refunded"}),
        )
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_delete_booking() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "100.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-04", 2)
        .await;
    let path = format!("/api/bookings/{}", booking["id"]);

    assert_eq!(server.delete_as(&host, &path).await.status(), 403);
    assert_eq!(server.delete_as(&guest, &path).await.status(), 204);
    assert_eq!(server.get(&path).await.status(), 404);
    assert_eq!(server.delete_as(&guest, &path).await.status(), 404);
}
