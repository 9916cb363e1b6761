//! Direct messages between users of one industry.

#![cfg(feature = "test-staging")]

mod common;

use rocket::http::Status;
use rocket::tokio;
use serde_json::json;

use common::{TEST_PASSWORD, auth_as, client, get_json, login, phones, post_json, user_id};

#[tokio::test]
async fn test_conversation_round_trip() {
    let client = client().await;
    let manager_id = user_id(&login(&client, phones::MANAGER_A1, TEST_PASSWORD).await);
    let officer_id = user_id(&login(&client, phones::FO_A1, TEST_PASSWORD).await);
    let manager = auth_as(&client, phones::MANAGER_A1).await;
    let officer = auth_as(&client, phones::FO_A1).await;

    let (status, first) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": officer_id, "content": "Check plot 101 today."}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(first["sender_id"], manager_id);
    assert!(first["read_at"].is_null());

    let (status, second) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": officer_id, "content": "And bring the sprayer back."}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(second["conversation_id"], first["conversation_id"]);

    let (_, unread) = get_json(&client, "/api/messaging/unread-count", &officer).await;
    assert_eq!(unread["unread_count"], 2);

    let (status, conversations) = get_json(&client, "/api/messaging/conversations", &officer).await;
    assert_eq!(status, Status::Ok);
    let conversations = conversations.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["id"], first["conversation_id"]);
    assert_eq!(conversations[0]["other_participant_id"], manager_id);
    assert_eq!(conversations[0]["unread_count"], 2);

    let uri = format!("/api/messaging/conversations/{}/messages", first["conversation_id"]);
    let (status, messages) = get_json(&client, &uri, &officer).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(messages.as_array().unwrap().len(), 2);

    // Only the recipient may mark a message read.
    let read_uri = format!("/api/messaging/messages/{}/read", first["id"]);
    let (status, _) = post_json(&client, &read_uri, &manager, json!({})).await;
    assert_eq!(status, Status::Forbidden);
    let (status, read) = post_json(&client, &read_uri, &officer, json!({})).await;
    assert_eq!(status, Status::Ok);
    assert!(read["read_at"].is_string());

    let read_all = format!("/api/messaging/conversations/{}/read", first["conversation_id"]);
    let (status, marked) = post_json(&client, &read_all, &officer, json!({})).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(marked["marked_read"], 1);

    let (_, unread) = get_json(&client, "/api/messaging/unread-count", &officer).await;
    assert_eq!(unread["unread_count"], 0);
}

#[tokio::test]
async fn test_outsiders_cannot_read_conversations() {
    let client = client().await;
    let officer_id = user_id(&login(&client, phones::FO_A1, TEST_PASSWORD).await);
    let manager = auth_as(&client, phones::MANAGER_A1).await;

    let (_, message) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": officer_id, "content": "Private"}),
    )
    .await;

    let outsider = auth_as(&client, phones::FARMER_A1).await;
    let uri = format!("/api/messaging/conversations/{}/messages", message["conversation_id"]);
    let (status, _) = get_json(&client, &uri, &outsider).await;
    assert_eq!(status, Status::NotFound);

    let read_uri = format!("/api/messaging/messages/{}/read", message["id"]);
    let (status, _) = post_json(&client, &read_uri, &outsider, json!({})).await;
    assert_eq!(status, Status::NotFound);
}

#[tokio::test]
async fn test_who_may_message_whom() {
    let client = client().await;
    let manager_a2 = user_id(&login(&client, phones::MANAGER_A2, TEST_PASSWORD).await);
    let manager_b = user_id(&login(&client, phones::MANAGER_B, TEST_PASSWORD).await);
    let farmer_a1 = user_id(&login(&client, phones::FARMER_A1, TEST_PASSWORD).await);
    let manager = auth_as(&client, phones::MANAGER_A1).await;

    // Same role.
    let (status, _) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": manager_a2, "content": "hi"}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    // Another industry.
    let owner = auth_as(&client, phones::OWNER_A).await;
    let (status, _) = post_json(
        &client,
        "/api/messaging/messages",
        &owner,
        json!({"recipient_id": manager_b, "content": "hi"}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    let (status, body) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": farmer_a1, "content": "   "}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["content"].is_array());

    let (status, body) = post_json(
        &client,
        "/api/messaging/messages",
        &manager,
        json!({"recipient_id": 99999, "content": "hello?"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["recipient_id"].is_array());

    // A Global Admin may message anyone.
    let admin = auth_as(&client, phones::SUPERADMIN).await;
    let (status, _) = post_json(
        &client,
        "/api/messaging/messages",
        &admin,
        json!({"recipient_id": manager_b, "content": "Welcome aboard"}),
    )
    .await;
    assert_eq!(status, Status::Created);
}

#[tokio::test]
async fn test_open_conversation_and_inbox() {
    let client = client().await;
    let owner_id = user_id(&login(&client, phones::OWNER_A, TEST_PASSWORD).await);
    let farmer_id = user_id(&login(&client, phones::FARMER_A1, TEST_PASSWORD).await);
    let foreign_id = user_id(&login(&client, phones::MANAGER_B, TEST_PASSWORD).await);
    let owner = auth_as(&client, phones::OWNER_A).await;
    let farmer = auth_as(&client, phones::FARMER_A1).await;

    let (status, opened) = post_json(
        &client,
        "/api/messaging/conversations",
        &owner,
        json!({"recipient_id": farmer_id}),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(opened["other_participant_id"], farmer_id);
    assert_eq!(opened["unread_count"], 0);
    assert!(opened["last_message_at"].is_null());

    let (_, again) = post_json(
        &client,
        "/api/messaging/conversations",
        &farmer,
        json!({"recipient_id": owner_id}),
    )
    .await;
    assert_eq!(again["id"], opened["id"]);

    let (status, body) = post_json(
        &client,
        "/api/messaging/conversations",
        &owner,
        json!({"recipient_id": foreign_id}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);
    assert_eq!(body["error_code"], "PERMISSION_DENIED");

    let (_, hello) = post_json(
        &client,
        "/api/messaging/messages",
        &owner,
        json!({"recipient_id": farmer_id, "content": "Harvest starts Monday."}),
    )
    .await;
    let (_, reply) = post_json(
        &client,
        "/api/messaging/messages",
        &farmer,
        json!({"recipient_id": owner_id, "content": "Noted."}),
    )
    .await;
    assert_eq!(hello["conversation_id"], opened["id"]);

    let (status, mine) = get_json(&client, "/api/messaging/messages", &farmer).await;
    assert_eq!(status, Status::Ok);
    let mine: Vec<_> = mine.as_array().unwrap().iter().map(|m| m["id"].clone()).collect();
    assert_eq!(mine, vec![reply["id"].clone(), hello["id"].clone()]);

    let (status, unread) = get_json(&client, "/api/messaging/messages/unread", &farmer).await;
    assert_eq!(status, Status::Ok);
    let unread = unread.as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["id"], hello["id"]);

    let outsider = auth_as(&client, phones::MANAGER_B).await;
    let (_, none) = get_json(&client, "/api/messaging/messages", &outsider).await;
    assert!(none.as_array().unwrap().is_empty());
}
