//! Row scoping across industries and the creation hierarchy.

#![cfg(feature = "test-staging")]

#[macro_use]
extern crate time_test;

mod common;

use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use common::{auth_as, client, get_json, ids, login, phones, post_json, put_json, user_id, TEST_PASSWORD};

async fn create_plot(client: &Client, phone: &str, body: Value) -> i64 {
    let auth = auth_as(client, phone).await;
    let (status, plot) = post_json(client, "/api/plots", &auth, body).await;
    assert_eq!(status, Status::Created, "plot creation by {} failed: {}", phone, plot);
    plot["id"].as_i64().unwrap()
}

async fn visible_plots(client: &Client, phone: &str) -> Vec<i64> {
    let auth = auth_as(client, phone).await;
    let (status, body) = get_json(client, "/api/plots", &auth).await;
    assert_eq!(status, Status::Ok);
    ids(&body)
}

#[tokio::test]
async fn test_plot_visibility_follows_hierarchy() {
    let client = client().await;
    time_test!("test_plot_visibility_follows_hierarchy");

    let farmer_a1 = user_id(&login(&client, phones::FARMER_A1, TEST_PASSWORD).await);

    let by_manager = create_plot(&client, phones::MANAGER_A1, json!({"gat_number": "101"})).await;
    let by_officer = create_plot(
        &client,
        phones::FO_A1,
        json!({"gat_number": "102", "farmer_id": farmer_a1}),
    )
    .await;
    let by_other_farmer =
        create_plot(&client, phones::FARMER_A2, json!({"gat_number": "103"})).await;
    let other_industry = create_plot(&client, phones::OWNER_B, json!({"gat_number": "201"})).await;

    assert_eq!(
        visible_plots(&client, phones::SUPERADMIN).await,
        vec![by_manager, by_officer, by_other_farmer, other_industry]
    );
    assert_eq!(
        visible_plots(&client, phones::OWNER_A).await,
        vec![by_manager, by_officer, by_other_farmer]
    );
    assert_eq!(visible_plots(&client, phones::MANAGER_A1).await, vec![by_manager, by_officer]);
    assert_eq!(visible_plots(&client, phones::MANAGER_A2).await, vec![by_other_farmer]);
    assert_eq!(visible_plots(&client, phones::FO_A1).await, vec![by_officer]);
    assert_eq!(visible_plots(&client, phones::FARMER_A1).await, vec![by_officer]);
    assert_eq!(visible_plots(&client, phones::FARMER_A2).await, vec![by_other_farmer]);
    assert_eq!(visible_plots(&client, phones::OWNER_B).await, vec![other_industry]);
    assert!(visible_plots(&client, phones::DRIFTER).await.is_empty());
}

#[tokio::test]
async fn test_records_are_stamped_with_creator_industry() {
    let client = client().await;

    let login_body = login(&client, phones::FO_A2, TEST_PASSWORD).await;
    let auth = auth_as(&client, phones::FO_A2).await;
    let (status, plot) = post_json(
        &client,
        "/api/plots",
        &auth,
        json!({"gat_number": "55", "industry_id": 9999}),
    )
    .await;

    assert_eq!(status, Status::Created);
    assert_eq!(plot["created_by"], login_body["user"]["id"]);
    assert_eq!(plot["industry_id"], login_body["user"]["industry"]["id"]);
}

#[tokio::test]
async fn test_cross_tenant_objects_answer_not_found() {
    let client = client().await;

    let plot = create_plot(&client, phones::OWNER_A, json!({"gat_number": "7"})).await;
    let uri = format!("/api/plots/{}", plot);

    let outsider = auth_as(&client, phones::OWNER_B).await;
    let (status, body) = get_json(&client, &uri, &outsider).await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error_code"], "NOT_FOUND");

    let (status, _) = put_json(&client, &uri, &outsider, json!({"village": "Elsewhere"})).await;
    assert_eq!(status, Status::NotFound);

    let response = client.delete(uri.clone()).header(outsider.clone()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let owner = auth_as(&client, phones::OWNER_A).await;
    let (status, body) = get_json(&client, &uri, &owner).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["gat_number"], "7");
}

#[tokio::test]
async fn test_assignee_must_be_visible() {
    let client = client().await;

    let farmer_a2 = user_id(&login(&client, phones::FARMER_A2, TEST_PASSWORD).await);
    let auth = auth_as(&client, phones::FO_A1).await;

    let (status, body) = post_json(
        &client,
        "/api/plots",
        &auth,
        json!({"gat_number": "9", "farmer_id": farmer_a2}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(body["errors"]["farmer_id"].is_array());
}

#[tokio::test]
async fn test_blank_gat_number_is_rejected() {
    let client = client().await;
    let auth = auth_as(&client, phones::OWNER_A).await;

    let (status, body) = post_json(&client, "/api/plots", &auth, json!({"gat_number": "  "})).await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["gat_number"].is_array());
}

#[tokio::test]
async fn test_task_writes_need_field_staff() {
    let client = client().await;

    let farmer = auth_as(&client, phones::FARMER_A1).await;
    let (status, body) = post_json(&client, "/api/tasks", &farmer, json!({"title": "Weed"})).await;
    assert_eq!(status, Status::Forbidden);
    assert_eq!(body["error_code"], "PERMISSION_DENIED");

    let farmer_a1 = user_id(&login(&client, phones::FARMER_A1, TEST_PASSWORD).await);
    let officer = auth_as(&client, phones::FO_A1).await;
    let (status, task) = post_json(
        &client,
        "/api/tasks",
        &officer,
        json!({"title": "Weed the east plot", "assigned_to": farmer_a1}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");

    // The farmer sees the task assigned to them but still cannot edit it.
    let (status, tasks) = get_json(&client, "/api/tasks", &farmer).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(ids(&tasks), vec![task["id"].as_i64().unwrap()]);

    let uri = format!("/api/tasks/{}", task["id"]);
    let (status, _) = put_json(&client, &uri, &farmer, json!({"status": "completed"})).await;
    assert_eq!(status, Status::Forbidden);
}
