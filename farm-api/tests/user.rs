//! User creation rules, self-service and hierarchy views.

#![cfg(feature = "test-staging")]

#[macro_use]
extern crate time_test;

mod common;

use rocket::http::Status;
use rocket::tokio;
use serde_json::json;

use common::{TEST_PASSWORD, auth_as, client, get_json, ids, login, phones, post_json, put_json};

#[tokio::test]
async fn test_field_officer_creates_farmer_by_default() {
    let client = client().await;
    time_test!("test_field_officer_creates_farmer_by_default");
    let officer = auth_as(&client, phones::FO_A1).await;
    let (_, me) = get_json(&client, "/api/users/me", &officer).await;

    let (status, user) = post_json(
        &client,
        "/api/users",
        &officer,
        json!({"phone_number": "+91 98220 11223", "password": "seedling", "first_name": "Asha"}),
    )
    .await;

    assert_eq!(status, Status::Created);
    assert_eq!(user["role"]["name"], "farmer");
    assert_eq!(user["username"], "user_9822011223");
    assert_eq!(user["phone_number"], "9822011223");
    assert_eq!(user["industry"]["id"], me["industry"]["id"]);
    assert_eq!(user["created_by"], me["id"]);

    // The new farmer can log in and shows up under the officer.
    login(&client, "9822011223", "seedling").await;
    let (_, farmers) = get_json(&client, "/api/users?role=farmer", &officer).await;
    assert!(ids(&farmers).contains(&user["id"].as_i64().unwrap()));
}

#[tokio::test]
async fn test_creation_rules() {
    let client = client().await;

    let farmer = auth_as(&client, phones::FARMER_A1).await;
    let (status, _) = post_json(
        &client,
        "/api/users",
        &farmer,
        json!({"phone_number": "9822000001", "password": "x", "role": "farmer"}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    let officer = auth_as(&client, phones::FO_A1).await;
    let (status, _) = post_json(
        &client,
        "/api/users",
        &officer,
        json!({"phone_number": "9822000002", "password": "x", "role": "Manager"}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    let owner = auth_as(&client, phones::OWNER_A).await;
    let (status, body) = post_json(
        &client,
        "/api/users",
        &owner,
        json!({"phone_number": "9822000003", "password": "x"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["role_id"].is_array());

    let (status, body) = post_json(
        &client,
        "/api/users",
        &owner,
        json!({"phone_number": "98220", "password": "", "role": "manager"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["phone_number"].is_array());
    assert!(body["errors"]["password"].is_array());

    let (status, user) = post_json(
        &client,
        "/api/users",
        &owner,
        json!({"phone_number": "9822000004", "password": "x", "role": "Manager"}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(user["role"]["name"], "manager");

    let manager = auth_as(&client, phones::MANAGER_A1).await;
    let (status, user) = post_json(
        &client,
        "/api/users",
        &manager,
        json!({"phone_number": "9822000005", "password": "x", "role": "Field Officer"}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(user["role"]["name"], "fieldofficer");
}

#[tokio::test]
async fn test_global_admin_picks_the_industry() {
    let client = client().await;
    let admin = auth_as(&client, phones::SUPERADMIN).await;
    let (_, owner_b) = get_json(
        &client,
        "/api/users?role=owner",
        &auth_as(&client, phones::OWNER_B).await,
    )
    .await;
    let industry_b = owner_b[0]["industry"]["id"].clone();

    let (status, body) = post_json(
        &client,
        "/api/users",
        &admin,
        json!({"phone_number": "9822000006", "password": "x", "role": "owner"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["industry_id"].is_array());

    let (status, user) = post_json(
        &client,
        "/api/users",
        &admin,
        json!({"phone_number": "9822000006", "password": "x", "role": "owner", "industry_id": industry_b}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(user["industry"]["id"], industry_b);
}

#[tokio::test]
async fn test_user_visibility_and_updates() {
    let client = client().await;
    let farmer_a2 = login(&client, phones::FARMER_A2, TEST_PASSWORD).await;
    let farmer_a2_uri = format!("/api/users/{}", farmer_a2["user"]["id"]);

    let officer = auth_as(&client, phones::FO_A1).await;
    let (status, _) = get_json(&client, &farmer_a2_uri, &officer).await;
    assert_eq!(status, Status::NotFound);

    let owner = auth_as(&client, phones::OWNER_A).await;
    let (status, user) = put_json(&client, &farmer_a2_uri, &owner, json!({"first_name": "Meera"})).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(user["first_name"], "Meera");

    let (_, me) = get_json(&client, "/api/users/me", &owner).await;
    let (status, body) = put_json(
        &client,
        &format!("/api/users/{}", me["id"]),
        &owner,
        json!({"is_active": false}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["is_active"].is_array());

    let response = client
        .delete(format!("/api/users/{}", me["id"]))
        .header(owner.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client.delete(farmer_a2_uri.clone()).header(owner.clone()).dispatch().await;
    assert_eq!(response.status(), Status::NoContent);
    let (status, _) = get_json(&client, &farmer_a2_uri, &owner).await;
    assert_eq!(status, Status::NotFound);
}

#[tokio::test]
async fn test_change_own_password() {
    let client = client().await;
    let farmer = auth_as(&client, phones::FARMER_A1).await;

    let (status, body) = post_json(
        &client,
        "/api/users/me/password",
        &farmer,
        json!({"old_password": "nope", "new_password": "harvest2025"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["old_password"].is_array());

    let (status, _) = post_json(
        &client,
        "/api/users/me/password",
        &farmer,
        json!({"old_password": TEST_PASSWORD, "new_password": "harvest2025"}),
    )
    .await;
    assert_eq!(status, Status::Ok);
    login(&client, phones::FARMER_A1, "harvest2025").await;
}

#[tokio::test]
async fn test_hierarchy_summary_counts_users_below() {
    let client = client().await;

    let manager = auth_as(&client, phones::MANAGER_A1).await;
    let (status, summary) = get_json(&client, "/api/users/hierarchy-summary", &manager).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(summary["role"], "manager");
    assert_eq!(summary["managers"], 0);
    assert_eq!(summary["field_officers"], 1);
    assert_eq!(summary["farmers"], 2);
    assert_eq!(summary["total_users"], 3);

    let owner = auth_as(&client, phones::OWNER_A).await;
    let (_, summary) = get_json(&client, "/api/users/hierarchy-summary", &owner).await;
    assert_eq!(summary["owners"], 0);
    assert_eq!(summary["managers"], 2);
    assert_eq!(summary["field_officers"], 2);
    assert_eq!(summary["farmers"], 3);
    assert_eq!(summary["total_users"], 7);

    let drifter = auth_as(&client, phones::DRIFTER).await;
    let (_, summary) = get_json(&client, "/api/users/hierarchy-summary", &drifter).await;
    assert_eq!(summary["total_users"], 0);

    let admin = auth_as(&client, phones::SUPERADMIN).await;
    let (_, summary) = get_json(&client, "/api/users/hierarchy-summary", &admin).await;
    assert_eq!(summary["role"], "global_admin");
}

#[tokio::test]
async fn test_industry_data_is_limited_to_own_industry() {
    let client = client().await;
    let owner = auth_as(&client, phones::OWNER_A).await;
    let (_, me) = get_json(&client, "/api/users/me", &owner).await;
    let own = me["industry"]["id"].as_i64().unwrap();

    let (status, body) = get_json(&client, "/api/users/industry-data", &owner).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error_code"], "MISSING_FIELDS");

    let (status, data) =
        get_json(&client, &format!("/api/users/industry-data?industry_id={}", own), &owner).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(data["industry"]["name"], "Green Valley Farms");
    assert_eq!(data["owners"].as_array().unwrap().len(), 1);
    assert_eq!(data["managers"].as_array().unwrap().len(), 2);
    assert_eq!(data["field_officers"].as_array().unwrap().len(), 2);
    assert_eq!(data["farmers"].as_array().unwrap().len(), 3);
    assert!(data["plots"].as_array().unwrap().is_empty());

    let (status, _) = get_json(
        &client,
        &format!("/api/users/industry-data?industry_id={}", own + 1),
        &owner,
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    let (status, _) =
        get_json(&client, "/api/users/industry-data?industry_id=9999", &owner).await;
    assert_eq!(status, Status::NotFound);

    let manager = auth_as(&client, phones::MANAGER_A1).await;
    let (status, _) =
        get_json(&client, &format!("/api/users/industry-data?industry_id={}", own), &manager).await;
    assert_eq!(status, Status::Forbidden);
}
