//! Review endpoints over HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::Response;
use serde_json::{Value, json};
use wayfarer_core::User;
use wayfarer_integration_tests::TestServer;

async fn review(server: &TestServer, guest: &User, booking: &Value, rating: i32) -> Response {
    server
        .post_as(
            guest,
            "/api/reviews",
            &json!({"booking_id": booking["id"], "rating": rating, "comment": "Great stay"}),
        )
        .await
}

#[tokio::test]
async fn test_review_updates_listing_stats() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "120.00", 4).await;

    let first = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-03", 2)
        .await;
    let second = server
        .create_booking(&guest, &listing["id"], "2030-07-01", "2030-07-03", 2)
        .await;

    let response = review(&server, &guest, &first, 4).await;
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["booking"], first["id"]);
    assert_eq!(created["listing"], listing["id"]);
    assert_eq!(created["guest"]["username"], "jane_smith");

    assert_eq!(review(&server, &guest, &second, 5).await.status(), 201);

    let stats: Value = server
        .get(&format!("/api/listings/{}", listing["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stats["average_rating"], "4.50");
    assert_eq!(stats["review_count"], 2);
}

#[tokio::test]
async fn test_second_review_for_booking_conflicts() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "120.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-03", 2)
        .await;

    assert_eq!(review(&server, &guest, &booking, 5).await.status(), 201);

    let response = review(&server, &guest, &booking, 3).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "constraint_violation");

    let reviews: Vec<Value> = server.get("/api/reviews").await.json().await.unwrap();
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_rating_out_of_range() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "120.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-03", 2)
        .await;

    for rating in [0, 6] {
        let response = review(&server, &guest, &booking, rating).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Rating must be between 1 and 5");
    }

    let response = review(&server, &guest, &json!({"id": 999}), 4).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_guest_edits_review() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "120.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-03", 2)
        .await;
    let created: Value = review(&server, &guest, &booking, 4).await.json().await.unwrap();
    let path = format!("/api/reviews/{}", created["id"]);

    let response = server.patch_as(&host, &path, &json!({"rating": 1})).await;
    assert_eq!(response.status(), 403);

    let response = server.patch_as(&guest, &path, &json!({"rating": 7})).await;
    assert_eq!(response.status(), 400);

    let response = server
        .patch_as(&guest, &path, &json!({"comment": "Even better on reflection"}))
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["rating"], 4);
    assert_eq!(updated["comment"], "Even better on reflection");

    let response = server.put_as(&guest, &path, &json!({"rating": 2})).await;
    assert_eq!(response.status(), 200);
    let replaced: Value = response.json().await.unwrap();
    assert_eq!(replaced["rating"], 2);
    assert_eq!(replaced["comment"], "");
}

#[tokio::test]
async fn test_deleting_booking_removes_review() {
    let server = TestServer::spawn().await;
    let host = server.create_user("john_doe").await;
    let guest = server.create_user("jane_smith").await;
    let listing = server.create_listing(&host, "120.00", 4).await;
    let booking = server
        .create_booking(&guest, &listing["id"], "2030-06-01", "2030-06-03", 2)
        .await;
    let created: Value = review(&server, &guest, &booking, 4).await.json().await.unwrap();

    let response = server
        .delete_as(&guest, &format!("/api/bookings/{}", booking["id"]))
        .await;
    assert_eq!(response.status(), 204);

    let response = server.get(&format!("/api/reviews/{}", created["id"])).await;
    assert_eq!(response.status(), 404);

    let stats: Value = server
        .get(&format!("/api/listings/{}", listing["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stats["average_rating"], Value::Null);
    assert_eq!(stats["review_count"], 0);
}
