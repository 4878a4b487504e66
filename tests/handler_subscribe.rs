mod common;

use axum::{Router, http::StatusCode, routing::post};
use axum_test::TestServer;
use podcast_site::api::handlers::subscribe_handler;
use serde_json::json;

fn subscribe_server(dir: &common::TempDir) -> TestServer {
    let state = common::create_test_state(dir, common::TestOptions::default());
    let app = Router::new()
        .route("/api/subscribe", post(subscribe_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_subscribe_success() {
    let dir = common::TempDir::new();
    let server = subscribe_server(&dir);

    let response = server
        .post("/api/subscribe")
        .json(&json!({"email": "listener@example.com"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"success": true, "message": "Thanks for subscribing!"}));

    let content = std::fs::read_to_string(dir.records()).unwrap();
    assert!(content.starts_with("email,subscribed_at\n"));

    let rows = common::data_rows(&dir);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("listener@example.com,"));
}

#[tokio::test]
async fn test_subscribe_duplicate_is_indistinguishable() {
    let dir = common::TempDir::new();
    let server = subscribe_server(&dir);

    let first = server
        .post("/api/subscribe")
        .json(&json!({"email": "Listener@Example.com"}))
        .await;
    let second = server
        .post("/api/subscribe")
        .json(&json!({"email": "  listener@example.COM "}))
        .await;

    first.assert_status_ok();
    second.assert_status_ok();
    assert_eq!(first.text(), second.text());

    let rows = common::data_rows(&dir);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("listener@example.com,"));
}

#[tokio::test]
async fn test_subscribe_matches_quoted_legacy_row() {
    let dir = common::TempDir::new();
    std::fs::write(
        dir.records(),
        "email,subscribed_at\n\"old@example.com\",2023-01-01T00:00:00.000Z\n",
    )
    .unwrap();
    let server = subscribe_server(&dir);

    server
        .post("/api/subscribe")
        .json(&json!({"email": "OLD@example.com"}))
        .await
        .assert_status_ok();

    assert_eq!(common::data_rows(&dir).len(), 1);
}

#[tokio::test]
async fn test_subscribe_invalid_email() {
    let dir = common::TempDir::new();
    let server = subscribe_server(&dir);

    for email in ["not-an-email", "", "=cmd@example.com", "a b@example.com", "x@y"] {
        let response = server
            .post("/api/subscribe")
            .json(&json!({"email": email}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid email address"}));
    }

    assert!(!dir.records().exists());
}

#[tokio::test]
async fn test_subscribe_non_string_email() {
    let dir = common::TempDir::new();
    let server = subscribe_server(&dir);

    for body in [json!({"email": 12}), json!({"email": ["a@b.co"]}), json!({})] {
        let response = server.post("/api/subscribe").json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid email address"}));
    }
}

#[tokio::test]
async fn test_subscribe_malformed_body() {
    let dir = common::TempDir::new();
    let server = subscribe_server(&dir);

    let response = server
        .post("/api/subscribe")
        .content_type("application/json")
        .text("{\"email\": ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn test_subscribe_concurrent_same_email() {
    let dir = common::TempDir::new();
    let state = common::create_test_state(&dir, common::TestOptions::default());

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = state.subscriber_service.clone();
        let email = if i % 2 == 0 {
            "race@example.com".to_string()
        } else {
            format!("racer{i}@example.com")
        };
        handles.push(tokio::spawn(async move { service.subscribe(&email).await }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let rows = common::data_rows(&dir);
    assert_eq!(rows.len(), 11);
    assert_eq!(
        rows.iter()
            .filter(|r| r.starts_with("race@example.com,"))
            .count(),
        1
    );
}
