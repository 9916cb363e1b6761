//! Inventory, stock, vendors and purchase orders.

#![cfg(feature = "test-staging")]

mod common;

use rocket::http::Status;
use rocket::tokio;
use serde_json::json;

use common::{auth_as, client, get_json, phones, post_json, put_json};

#[tokio::test]
async fn test_items_carry_stock_level() {
    let client = client().await;
    let officer = auth_as(&client, phones::FO_A1).await;

    for (name, quantity) in [("Urea", 100), ("Potash", 5), ("Seeds", 0)] {
        let (status, _) = post_json(
            &client,
            "/api/inventory/items",
            &officer,
            json!({"item_name": name, "quantity": quantity, "reorder_level": 10, "category": "fertilizer"}),
        )
        .await;
        assert_eq!(status, Status::Created);
    }

    let (status, items) = get_json(&client, "/api/inventory/items", &officer).await;
    assert_eq!(status, Status::Ok);
    let level = |name: &str| {
        items
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["item_name"] == name)
            .map(|i| i["status"].clone())
            .unwrap()
    };
    assert_eq!(level("Urea"), "in_stock");
    assert_eq!(level("Potash"), "low_stock");
    assert_eq!(level("Seeds"), "out_of_stock");

    let (_, low) = get_json(&client, "/api/inventory/items/low-stock", &officer).await;
    assert_eq!(low.as_array().unwrap().len(), 2);

    let (status, body) = post_json(
        &client,
        "/api/inventory/items",
        &officer,
        json!({"item_name": "Broken", "quantity": -1}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["quantity"].is_array());

    let farmer = auth_as(&client, phones::FARMER_A1).await;
    let (status, _) = post_json(
        &client,
        "/api/inventory/items",
        &farmer,
        json!({"item_name": "Mine"}),
    )
    .await;
    assert_eq!(status, Status::Forbidden);
}

#[tokio::test]
async fn test_stock_filter_by_item_type() {
    let client = client().await;
    let manager = auth_as(&client, phones::MANAGER_A1).await;

    let (status, tractor) = post_json(
        &client,
        "/api/inventory/stock",
        &manager,
        json!({"item_name": "Tractor", "item_type": "equipment", "make": "Mahindra"}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(tractor["status"], "working");
    post_json(&client, "/api/inventory/stock", &manager, json!({"item_name": "Crates"})).await;

    let (_, equipment) = get_json(&client, "/api/inventory/stock?item_type=equipment", &manager).await;
    let equipment = equipment.as_array().unwrap();
    assert_eq!(equipment.len(), 1);
    assert_eq!(equipment[0]["item_name"], "Tractor");

    let uri = format!("/api/inventory/stock/{}", tractor["id"]);
    let (status, updated) = put_json(&client, &uri, &manager, json!({"status": "maintenance"})).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(updated["status"], "maintenance");
}

#[tokio::test]
async fn test_vendor_validation_and_orders() {
    let client = client().await;
    let owner = auth_as(&client, phones::OWNER_A).await;

    let (status, body) = post_json(
        &client,
        "/api/vendors",
        &owner,
        json!({"vendor_name": "Agro Supplies", "gstin_number": "NOT-A-GSTIN", "rating": 9}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert!(body["errors"]["gstin_number"].is_array());
    assert!(body["errors"]["rating"].is_array());

    let (status, vendor) = post_json(
        &client,
        "/api/vendors",
        &owner,
        json!({"vendor_name": "Agro Supplies", "gstin_number": " 27aapfu0939f1zv ", "rating": 4}),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(vendor["gstin_number"], "27AAPFU0939F1ZV");

    let (status, order) = post_json(
        &client,
        "/api/vendors/orders",
        &owner,
        json!({
            "vendor_id": vendor["id"],
            "invoice_number": "INV-001",
            "invoice_date": "2025-04-01",
            "state": "Maharashtra",
            "items": [
                {"item_name": "Drip pipes", "estimate_cost": 12000.0},
                {"item_name": "Valves"}
            ]
        }),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(order["vendor_name"], "Agro Supplies");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    let (_, orders) = get_json(
        &client,
        &format!("/api/vendors/orders?vendor_id={}", vendor["id"]),
        &owner,
    )
    .await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // Another industry cannot order from this vendor.
    let other = auth_as(&client, phones::OWNER_B).await;
    let (status, _) = post_json(
        &client,
        "/api/vendors/orders",
        &other,
        json!({
            "vendor_id": vendor["id"],
            "invoice_number": "INV-002",
            "invoice_date": "2025-04-02",
            "state": "Gujarat"
        }),
    )
    .await;
    assert_eq!(status, Status::BadRequest);

    let officer = auth_as(&client, phones::FO_A1).await;
    let (status, _) = post_json(&client, "/api/vendors", &officer, json!({"vendor_name": "X"})).await;
    assert_eq!(status, Status::Forbidden);
}

#[tokio::test]
async fn test_deleting_vendor_removes_its_orders() {
    let client = client().await;
    let owner = auth_as(&client, phones::OWNER_A).await;

    let (_, vendor) =
        post_json(&client, "/api/vendors", &owner, json!({"vendor_name": "Seed House"})).await;
    let (status, order) = post_json(
        &client,
        "/api/vendors/orders",
        &owner,
        json!({
            "vendor_id": vendor["id"],
            "invoice_number": "INV-010",
            "invoice_date": "2025-05-01",
            "state": "Maharashtra",
            "items": [{"item_name": "Seed drill"}]
        }),
    )
    .await;
    assert_eq!(status, Status::Created);

    let response = client
        .delete(format!("/api/vendors/{}", vendor["id"]))
        .header(owner.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let (status, _) =
        get_json(&client, &format!("/api/vendors/orders/{}", order["id"]), &owner).await;
    assert_eq!(status, Status::NotFound);
    let (_, orders) = get_json(&client, "/api/vendors/orders", &owner).await;
    assert!(orders.as_array().unwrap().is_empty());
}
