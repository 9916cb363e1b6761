//! Helpers shared by the API integration tests.

#![allow(dead_code)]

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use farm_api::orm::testing::test_rocket;

pub use farm_api::orm::testing::{TEST_PASSWORD, phones};

pub async fn client() -> Client {
    Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance")
}

/// Logs in and returns the full login response body.
pub async fn login(client: &Client, phone: &str, password: &str) -> Value {
    let response = client
        .post("/api/users/login")
        .json(&json!({"phone_number": phone, "password": password}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login as {} failed", phone);
    response.into_json().await.expect("login body")
}

/// An `Authorization` header for a fixture user.
pub async fn auth_as(client: &Client, phone: &str) -> Header<'static> {
    let password = if phone == phones::SUPERADMIN { "admin" } else { TEST_PASSWORD };
    let body = login(client, phone, password).await;
    let token = body["access"].as_str().expect("access token").to_string();
    Header::new("Authorization", format!("Bearer {}", token))
}

pub async fn get_json(client: &Client, uri: &str, auth: &Header<'static>) -> (Status, Value) {
    let response = client.get(uri.to_string()).header(auth.clone()).dispatch().await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

pub async fn post_json(
    client: &Client,
    uri: &str,
    auth: &Header<'static>,
    body: Value,
) -> (Status, Value) {
    let response = client
        .post(uri.to_string())
        .header(auth.clone())
        .json(&body)
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

pub async fn put_json(
    client: &Client,
    uri: &str,
    auth: &Header<'static>,
    body: Value,
) -> (Status, Value) {
    let response = client
        .put(uri.to_string())
        .header(auth.clone())
        .json(&body)
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

/// Ids of the objects in a JSON array response.
pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|v| v["id"].as_i64().expect("id"))
        .collect()
}

pub fn user_id(login_body: &Value) -> i64 {
    login_body["user"]["id"].as_i64().expect("user id")
}
