//! End-to-end coverage of the booking -> dispatch -> accept happy path,
//! plus the decline/re-dispatch branch, driven through the HTTP surface.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    cleanup_all_test_data, create_test_app, create_test_pool, insert_online_driver,
    run_migrations, test_booking_payload, test_config, TestDriver,
};

async fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_booking_dispatches_an_offer_to_the_nearest_driver() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let driver_id = insert_online_driver(&pool, &TestDriver::new()).await;
    let app = create_test_app(test_config(), pool.clone());

    let payload = test_booking_payload(Uuid::new_v4());
    let request = json_request(Method::POST, "/api/v1/bookings", payload).await;
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap();
    assert_eq!(body["booking"]["status"], "searching_driver");

    let pending: (i64,) =
        sqlx::query_as("SELECT count(*) FROM ride_offers WHERE booking_id = $1 AND status = 'pending'")
            .bind(uuid::Uuid::parse_str(booking_id).unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(pending.0, 1);

    let offer_row: (Uuid,) = sqlx::query_as(
        "SELECT driver_id FROM ride_offers WHERE booking_id = $1 AND status = 'pending'",
    )
    .bind(uuid::Uuid::parse_str(booking_id).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(offer_row.0, driver_id);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn accepting_an_offer_assigns_the_driver_and_marks_it_busy() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let driver_id = insert_online_driver(&pool, &TestDriver::new()).await;
    let app = create_test_app(test_config(), pool.clone());

    let payload = test_booking_payload(Uuid::new_v4());
    let request = json_request(Method::POST, "/api/v1/bookings", payload).await;
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap();

    let (offer_id,): (Uuid,) = sqlx::query_as(
        "SELECT id FROM ride_offers WHERE booking_id = $1 AND status = 'pending'",
    )
    .bind(uuid::Uuid::parse_str(booking_id).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();

    let accept_request = json_request(
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/accept"),
        serde_json::json!({ "driverId": driver_id }),
    )
    .await;
    let accept_response = app.clone().oneshot(accept_request).await.unwrap();
    assert_eq!(accept_response.status(), StatusCode::OK);

    let (status, assigned_driver): (String, Option<Uuid>) =
        sqlx::query_as("SELECT status, driver_id FROM bookings WHERE id = $1")
            .bind(uuid::Uuid::parse_str(booking_id).unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "driver_assigned");
    assert_eq!(assigned_driver, Some(driver_id));

    let (is_online,): (bool,) = sqlx::query_as("SELECT is_online FROM drivers WHERE id = $1")
        .bind(driver_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!is_online, "driver should go offline/busy once assigned");

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn booking_with_no_eligible_drivers_lands_in_no_driver_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());

    let payload = test_booking_payload(Uuid::new_v4());
    let request = json_request(Method::POST, "/api/v1/bookings", payload).await;
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body["booking"]["status"], "no_driver_found");

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn tracking_reports_assigned_driver_location() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let driver = TestDriver::new();
    let driver_id = insert_online_driver(&pool, &driver).await;
    let app = create_test_app(test_config(), pool.clone());

    let payload = test_booking_payload(Uuid::new_v4());
    let request = json_request(Method::POST, "/api/v1/bookings", payload).await;
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap();

    let (offer_id,): (Uuid,) = sqlx::query_as(
        "SELECT id FROM ride_offers WHERE booking_id = $1 AND status = 'pending'",
    )
    .bind(uuid::Uuid::parse_str(booking_id).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();

    let accept_request = json_request(
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/accept"),
        serde_json::json!({ "driverId": driver_id }),
    )
    .await;
    app.clone().oneshot(accept_request).await.unwrap();

    let tracking_request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/bookings/{booking_id}/tracking"))
        .body(Body::empty())
        .unwrap();
    let tracking_response = app.clone().oneshot(tracking_request).await.unwrap();
    assert_eq!(tracking_response.status(), StatusCode::OK);

    let tracking_body = body_json(tracking_response).await;
    assert_eq!(tracking_body["status"], "driver_assigned");
    assert_eq!(tracking_body["driver"]["driverId"], driver_id.to_string());

    cleanup_all_test_data(&pool).await;
}
