//! Booking endpoints.
//!
//! Any authenticated user may book. Approval and rejection are for owners
//! and managers, and record the approver.

use chrono::NaiveDateTime;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, record_stamp};
use crate::auth_guards::{AuthenticatedUser, OwnerOrManagerUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Booking, BookingChanges, BookingInput, BookingStatus, RoleKind};
use crate::orm::DbConn;
use crate::orm::booking::{
    decide_booking, delete_booking, get_booking, insert_booking, list_bookings, update_booking,
};
use crate::tenancy::TenantScope;

fn check_period(start: NaiveDateTime, end: NaiveDateTime) -> ApiResult<()> {
    if end <= start {
        return Err(ApiError::invalid(
            "end_date",
            "End date must be after start date",
        ));
    }
    Ok(())
}

fn is_decision(status: BookingStatus) -> bool {
    matches!(status, BookingStatus::Approved | BookingStatus::Rejected)
}

/// List Bookings endpoint.
///
/// - **URL:** `/api/bookings?status=<status>`
/// - **Method:** `GET`
///
/// Newest first.
#[get("/bookings?<status>")]
pub async fn list_all(
    auth: AuthenticatedUser,
    db: DbConn,
    status: Option<String>,
) -> ApiResult<Json<Vec<Booking>>> {
    let status = match status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<BookingStatus>()
                .map_err(|e| ApiError::invalid("status", e))?,
        ),
    };
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_bookings(conn, &scope, status)?))
    })
    .await
}

/// Create Booking endpoint.
///
/// ```json
/// {"item_name": "Tractor", "start_date": "2025-03-01T09:00:00", "end_date": "2025-03-01T17:00:00"}
/// ```
///
/// The booking joins the caller's industry.
#[post("/bookings", data = "<request>")]
pub async fn create_one(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<BookingInput>>,
) -> ApiResult<status::Created<Json<Booking>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    check_period(input.start_date, input.end_date)?;
    let actor = auth.actor();
    if is_decision(input.status) && !actor.has_any_role(&[RoleKind::Owner, RoleKind::Manager]) {
        return Err(ApiError::forbidden(
            "Only owners and managers can approve or reject bookings.",
        ));
    }

    let booking = db
        .run(move |conn| -> ApiResult<_> {
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_booking(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/bookings/{}", booking.id);
    Ok(status::Created::new(location).body(Json(booking)))
}

#[get("/bookings/<booking_id>")]
pub async fn get_one(
    auth: AuthenticatedUser,
    db: DbConn,
    booking_id: i32,
) -> ApiResult<Json<Booking>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_booking(conn, booking_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Booking"))
    })
    .await
}

#[put("/bookings/<booking_id>", data = "<changes>")]
pub async fn update_one(
    auth: AuthenticatedUser,
    db: DbConn,
    booking_id: i32,
    changes: LoggedJson<BookingChanges>,
) -> ApiResult<Json<Booking>> {
    let changes = changes.into_inner();
    let actor = auth.actor();
    if changes.status.is_some_and(is_decision)
        && !actor.has_any_role(&[RoleKind::Owner, RoleKind::Manager])
    {
        return Err(ApiError::forbidden(
            "Only owners and managers can approve or reject bookings.",
        ));
    }

    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        let existing =
            get_booking(conn, booking_id, &scope)?.ok_or_else(|| ApiError::not_found("Booking"))?;
        check_period(
            changes.start_date.unwrap_or(existing.start_date),
            changes.end_date.unwrap_or(existing.end_date),
        )?;
        let decided = changes.status.is_some_and(is_decision);
        let changes = BookingChanges {
            approved_by: decided.then_some(actor.id),
            ..changes
        };
        Ok(Json(update_booking(conn, booking_id, changes)?))
    })
    .await
}

async fn decide(
    auth: OwnerOrManagerUser,
    db: DbConn,
    booking_id: i32,
    status: BookingStatus,
) -> ApiResult<Json<Booking>> {
    let actor = auth.actor();
    let booking = db
        .run(move |conn| -> ApiResult<_> {
            let scope = TenantScope::resolve(conn, &actor)?;
            if get_booking(conn, booking_id, &scope)?.is_none() {
                return Err(ApiError::not_found("Booking"));
            }
            Ok(decide_booking(conn, booking_id, status, actor.id)?)
        })
        .await?;
    info!("User {} set booking {} to {}", auth.user.id, booking_id, status);
    Ok(Json(booking))
}

#[post("/bookings/<booking_id>/approve")]
pub async fn approve(
    auth: OwnerOrManagerUser,
    db: DbConn,
    booking_id: i32,
) -> ApiResult<Json<Booking>> {
    decide(auth, db, booking_id, BookingStatus::Approved).await
}

#[post("/bookings/<booking_id>/reject")]
pub async fn reject(
    auth: OwnerOrManagerUser,
    db: DbConn,
    booking_id: i32,
) -> ApiResult<Json<Booking>> {
    decide(auth, db, booking_id, BookingStatus::Rejected).await
}

#[delete("/bookings/<booking_id>")]
pub async fn delete_one(
    auth: AuthenticatedUser,
    db: DbConn,
    booking_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_booking(conn, booking_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Booking"));
        }
        delete_booking(conn, booking_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_all, create_one, get_one, update_one, approve, reject, delete_one]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn period_must_move_forward() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let nine = day.and_hms_opt(9, 0, 0).unwrap();
        let five = day.and_hms_opt(17, 0, 0).unwrap();
        assert!(check_period(nine, five).is_ok());
        assert!(check_period(five, nine).is_err());
        let err = check_period(nine, nine).unwrap_err();
        assert_eq!(err.to_json()["errors"]["end_date"][0], "End date must be after start date");
    }
}
