//! Vendors and the orders placed with them.
//!
//! Reads follow the caller's scope. Writes are for owners and managers.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, record_stamp};
use crate::auth_guards::{AuthenticatedUser, OwnerOrManagerUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{OrderChanges, OrderInput, OrderWithItems, Vendor, VendorChanges, VendorInput};
use crate::orm::DbConn;
use crate::orm::order::{delete_order, get_order, insert_order, list_orders, update_order};
use crate::orm::vendor::{delete_vendor, get_vendor, insert_vendor, list_vendors, update_vendor};
use crate::tenancy::TenantScope;
use crate::validation::{FieldErrors, is_valid_gstin, require_non_blank};

/// Upper-cases a GSTIN and records format or rating problems.
fn check_vendor_fields(errors: &mut FieldErrors, gstin: &mut Option<String>, rating: Option<i32>) {
    *gstin = gstin
        .take()
        .map(|value| value.trim().to_ascii_uppercase())
        .filter(|value| !value.is_empty());
    if gstin.as_deref().is_some_and(|value| !is_valid_gstin(value)) {
        errors.add(
            "gstin_number",
            "Enter a valid 15-character GSTIN, e.g. 27AAPFU0939F1ZV.",
        );
    }
    if rating.is_some_and(|r| !(1..=5).contains(&r)) {
        errors.add("rating", "Rating must be between 1 and 5.");
    }
}

#[get("/vendors")]
pub async fn list_vendors_handler(
    auth: AuthenticatedUser,
    db: DbConn,
) -> ApiResult<Json<Vec<Vendor>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_vendors(conn, &scope)?))
    })
    .await
}

/// Create Vendor endpoint.
///
/// - **URL:** `/api/vendors`
/// - **Method:** `POST`
/// - **Authorization:** owner or manager
///
/// `gstin_number` is optional but unique when given; a duplicate answers 409.
#[post("/vendors", data = "<request>")]
pub async fn create_vendor(
    auth: OwnerOrManagerUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<VendorInput>>,
) -> ApiResult<status::Created<Json<Vendor>>> {
    let CreateRequest {
        mut input,
        industry_id,
    } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "vendor_name", &input.vendor_name);
    check_vendor_fields(&mut errors, &mut input.gstin_number, input.rating);
    errors.into_result()?;

    let actor = auth.actor();
    let vendor = db
        .run(move |conn| -> ApiResult<_> {
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_vendor(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/vendors/{}", vendor.id);
    Ok(status::Created::new(location).body(Json(vendor)))
}

#[get("/vendors/<vendor_id>")]
pub async fn get_vendor_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    vendor_id: i32,
) -> ApiResult<Json<Vendor>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_vendor(conn, vendor_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Vendor"))
    })
    .await
}

#[put("/vendors/<vendor_id>", data = "<changes>")]
pub async fn update_vendor_handler(
    auth: OwnerOrManagerUser,
    db: DbConn,
    vendor_id: i32,
    changes: LoggedJson<VendorChanges>,
) -> ApiResult<Json<Vendor>> {
    let mut changes = changes.into_inner();
    let mut errors = FieldErrors::new();
    if let Some(name) = &changes.vendor_name {
        require_non_blank(&mut errors, "vendor_name", name);
    }
    check_vendor_fields(&mut errors, &mut changes.gstin_number, changes.rating);
    errors.into_result()?;

    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_vendor(conn, vendor_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Vendor"));
        }
        Ok(Json(update_vendor(conn, vendor_id, changes)?))
    })
    .await
}

#[delete("/vendors/<vendor_id>")]
pub async fn delete_vendor_handler(
    auth: OwnerOrManagerUser,
    db: DbConn,
    vendor_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_vendor(conn, vendor_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Vendor"));
        }
        delete_vendor(conn, vendor_id)?;
        Ok(status::NoContent)
    })
    .await
}

/// List Orders endpoint.
///
/// - **URL:** `/api/vendors/orders?vendor_id=<id>`
/// - **Method:** `GET`
///
/// Orders come with their items and the vendor's name, newest invoice first.
#[get("/vendors/orders?<vendor_id>")]
pub async fn list_orders_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    vendor_id: Option<i32>,
) -> ApiResult<Json<Vec<OrderWithItems>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_orders(conn, &scope, vendor_id)?))
    })
    .await
}

/// Create Order endpoint.
///
/// ```json
/// {
///   "vendor_id": 3,
///   "invoice_number": "INV-0042",
///   "invoice_date": "2025-02-14",
///   "state": "Maharashtra",
///   "items": [{"item_name": "Sprayer", "estimate_cost": 4500.0}]
/// }
/// ```
///
/// The vendor must be visible to the caller. Order and items are written in
/// one transaction.
#[post("/vendors/orders", data = "<request>")]
pub async fn create_order(
    auth: OwnerOrManagerUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<OrderInput>>,
) -> ApiResult<status::Created<Json<OrderWithItems>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "invoice_number", &input.invoice_number);
    require_non_blank(&mut errors, "state", &input.state);
    for item in &input.items {
        require_non_blank(&mut errors, "items", &item.item_name);
    }
    errors.into_result()?;

    let actor = auth.actor();
    let order = db
        .run(move |conn| -> ApiResult<_> {
            let scope = TenantScope::resolve(conn, &actor)?;
            if get_vendor(conn, input.vendor_id, &scope)?.is_none() {
                return Err(ApiError::invalid("vendor_id", "Vendor not found."));
            }
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_order(conn, input, stamp)?)
        })
        .await?;

    info!(
        "User {} recorded order {} with {} items",
        auth.user.id,
        order.order.id,
        order.items.len()
    );
    let location = format!("/api/vendors/orders/{}", order.order.id);
    Ok(status::Created::new(location).body(Json(order)))
}

#[get("/vendors/orders/<order_id>")]
pub async fn get_order_handler(
    auth: AuthenticatedUser,
    db: DbConn,
    order_id: i32,
) -> ApiResult<Json<OrderWithItems>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_order(conn, order_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Order"))
    })
    .await
}

#[put("/vendors/orders/<order_id>", data = "<changes>")]
pub async fn update_order_handler(
    auth: OwnerOrManagerUser,
    db: DbConn,
    order_id: i32,
    changes: LoggedJson<OrderChanges>,
) -> ApiResult<Json<OrderWithItems>> {
    let changes = changes.into_inner();
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_order(conn, order_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Order"));
        }
        Ok(Json(update_order(conn, order_id, changes)?))
    })
    .await
}

#[delete("/vendors/orders/<order_id>")]
pub async fn delete_order_handler(
    auth: OwnerOrManagerUser,
    db: DbConn,
    order_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_order(conn, order_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Order"));
        }
        delete_order(conn, order_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        list_vendors_handler,
        create_vendor,
        get_vendor_handler,
        update_vendor_handler,
        delete_vendor_handler,
        list_orders_handler,
        create_order,
        get_order_handler,
        update_order_handler,
        delete_order_handler
    ]
}
