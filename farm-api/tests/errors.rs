//! Failures that never reach a handler still answer with the JSON error shape.

#![cfg(feature = "test-staging")]

mod common;

use rocket::http::{ContentType, Header, Status};
use rocket::tokio;

use common::{auth_as, client, phones};

#[tokio::test]
async fn test_missing_token() {
    let client = client().await;

    let response = client.get("/api/plots").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], "AUTHENTICATION_FAILED");
    assert_eq!(body["detail"], "Authentication credentials were not provided.");
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_garbage_token() {
    let client = client().await;

    let response = client
        .get("/api/plots")
        .header(Header::new("Authorization", "Bearer not.a.token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["detail"], "Token is invalid or expired");
}

#[tokio::test]
async fn test_unknown_route() {
    let client = client().await;

    let response = client.get("/api/no-such-thing").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], "NOT_FOUND");
    assert_eq!(body["error_type"], "NotFound");
}

#[tokio::test]
async fn test_malformed_body() {
    let client = client().await;
    let auth = auth_as(&client, phones::OWNER_A).await;

    let response = client
        .post("/api/plots")
        .header(auth)
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;
    assert!(response.status().code >= 400 && response.status().code < 500);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert!(body["error_code"].is_string());
}

#[tokio::test]
async fn test_status_is_public() {
    let client = client().await;

    let response = client.get("/api/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "running");
}
