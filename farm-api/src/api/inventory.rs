//! Consumable inventory and durable stock.
//!
//! Reads are open to every authenticated user within their scope; writes
//! need an owner, manager or field officer.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, record_stamp};
use crate::auth_guards::{AuthenticatedUser, FieldStaffUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{
    InventoryItemChanges, InventoryItemInput, InventoryItemWithStatus, Stock, StockChanges,
    StockInput, StockItemType,
};
use crate::orm::DbConn;
use crate::orm::inventory::{
    delete_item, get_item, insert_item, list_items, list_low_stock, update_item,
};
use crate::orm::stock::{delete_stock, get_stock, insert_stock, list_stock, update_stock};
use crate::tenancy::TenantScope;
use crate::validation::{FieldErrors, require_non_blank};

fn check_counts(errors: &mut FieldErrors, quantity: Option<i32>, reorder_level: Option<i32>) {
    if quantity.is_some_and(|q| q < 0) {
        errors.add("quantity", "Ensure this value is greater than or equal to 0.");
    }
    if reorder_level.is_some_and(|r| r < 0) {
        errors.add("reorder_level", "Ensure this value is greater than or equal to 0.");
    }
}

/// List Inventory Items endpoint.
///
/// - **URL:** `/api/inventory/items?category=<category>`
/// - **Method:** `GET`
///
/// Each item carries a derived `status`: `out_of_stock`, `low_stock` (at or
/// below the reorder level) or `in_stock`.
#[get("/inventory/items?<category>")]
pub async fn list_items_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    category: Option<String>,
) -> ApiResult<Json<Vec<InventoryItemWithStatus>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        let items = list_items(conn, &scope, category.as_deref().filter(|c| !c.is_empty()))?;
        Ok(Json(items.into_iter().map(InventoryItemWithStatus::from).collect()))
    })
    .await
}

#[get("/inventory/items/low-stock")]
pub async fn low_stock(
    auth: AuthenticatedUser,
    db: DbConn,
) -> ApiResult<Json<Vec<InventoryItemWithStatus>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        let items = list_low_stock(conn, &scope)?;
        Ok(Json(items.into_iter().map(InventoryItemWithStatus::from).collect()))
    })
    .await
}

#[post("/inventory/items", data = "<request>")]
pub async fn create_item(
    auth: FieldStaffUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<InventoryItemInput>>,
) -> ApiResult<status::Created<Json<InventoryItemWithStatus>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "item_name", &input.item_name);
    check_counts(&mut errors, Some(input.quantity), Some(input.reorder_level));
    errors.into_result()?;

    let actor = auth.actor();
    let item = db
        .run(move |conn| -> ApiResult<_> {
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_item(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/inventory/items/{}", item.id);
    Ok(status::Created::new(location).body(Json(item.into())))
}

#[get("/inventory/items/<item_id>")]
pub async fn get_item_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    item_id: i32,
) -> ApiResult<Json<InventoryItemWithStatus>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_item(conn, item_id, &scope)?
            .map(|item| Json(item.into()))
            .ok_or_else(|| ApiError::not_found("Inventory item"))
    })
    .await
}

#[put("/inventory/items/<item_id>", data = "<changes>")]
pub async fn update_item_handler(
    auth: FieldStaffUser,
    db: DbConn,
    item_id: i32,
    changes: LoggedJson<InventoryItemChanges>,
) -> ApiResult<Json<InventoryItemWithStatus>> {
    let changes = changes.into_inner();
    let mut errors = FieldErrors::new();
    check_counts(&mut errors, changes.quantity, changes.reorder_level);
    errors.into_result()?;

    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_item(conn, item_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Inventory item"));
        }
        Ok(Json(update_item(conn, item_id, changes)?.into()))
    })
    .await
}

#[delete("/inventory/items/<item_id>")]
pub async fn delete_item_handler(
    auth: FieldStaffUser,
    db: DbConn,
    item_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_item(conn, item_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Inventory item"));
        }
        delete_item(conn, item_id)?;
        Ok(status::NoContent)
    })
    .await
}

#[get("/inventory/stock?<item_type>")]
pub async fn list_stock_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    item_type: Option<String>,
) -> ApiResult<Json<Vec<Stock>>> {
    let item_type = match item_type.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<StockItemType>()
                .map_err(|e| ApiError::invalid("item_type", e))?,
        ),
    };
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_stock(conn, &scope, item_type)?))
    })
    .await
}

#[post("/inventory/stock", data = "<request>")]
pub async fn create_stock(
    auth: FieldStaffUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<StockInput>>,
) -> ApiResult<status::Created<Json<Stock>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "item_name", &input.item_name);
    errors.into_result()?;

    let actor = auth.actor();
    let stock = db
        .run(move |conn| -> ApiResult<_> {
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_stock(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/inventory/stock/{}", stock.id);
    Ok(status::Created::new(location).body(Json(stock)))
}

#[get("/inventory/stock/<stock_id>")]
pub async fn get_stock_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    stock_id: i32,
) -> ApiResult<Json<Stock>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_stock(conn, stock_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Stock"))
    })
    .await
}

#[put("/inventory/stock/<stock_id>", data = "<changes>")]
pub async fn update_stock_handler(
    auth: FieldStaffUser,
    db: DbConn,
    stock_id: i32,
    changes: LoggedJson<StockChanges>,
) -> ApiResult<Json<Stock>> {
    let changes = changes.into_inner();
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_stock(conn, stock_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Stock"));
        }
        Ok(Json(update_stock(conn, stock_id, changes)?))
    })
    .await
}

#[delete("/inventory/stock/<stock_id>")]
pub async fn delete_stock_handler(
    auth: FieldStaffUser,
    db: DbConn,
    stock_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_stock(conn, stock_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Stock"));
        }
        delete_stock(conn, stock_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        list_items_handler,
        low_stock,
        create_item,
        get_item_handler,
        update_item_handler,
        delete_item_handler,
        list_stock_handler,
        create_stock,
        get_stock_handler,
        update_stock_handler,
        delete_stock_handler
    ]
}
