//! HTTP endpoints, mounted under `/api`.
//!
//! Domain handlers share one shape: the guard authenticates, the handler
//! resolves the caller's [`TenantScope`](crate::tenancy::TenantScope) inside
//! `DbConn::run`, and every lookup goes through it so that rows outside the
//! scope answer 404.

use diesel::SqliteConnection;
use rocket::Route;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::orm::industry::get_industry;
use crate::tenancy::{Actor, RecordStamp, may_assign_to};

pub mod booking;
pub mod farm;
pub mod industry;
pub mod inventory;
pub mod login;
pub mod messaging;
pub mod plot;
pub mod role;
pub mod status;
pub mod task;
pub mod user;
pub mod vendor;

/// A create body: the entity fields plus an optional target industry,
/// honoured for Global Admins only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRequest<T> {
    #[serde(flatten)]
    pub input: T,
    #[serde(default)]
    pub industry_id: Option<i32>,
}

/// Industry and creator for a record `actor` is creating.
pub(crate) fn record_stamp(
    conn: &mut SqliteConnection,
    actor: &Actor,
    requested_industry: Option<i32>,
) -> ApiResult<RecordStamp> {
    let stamp = actor.stamp(requested_industry);
    if let Some(industry_id) = stamp.industry_id {
        if get_industry(conn, industry_id)?.is_none() {
            return Err(ApiError::invalid(
                "industry_id",
                format!("Industry with ID {} does not exist.", industry_id),
            ));
        }
    }
    Ok(stamp)
}

/// Rejects an owning user the caller could not see.
pub(crate) fn check_assignee(
    conn: &mut SqliteConnection,
    actor: &Actor,
    field: &str,
    user_id: Option<i32>,
) -> ApiResult<()> {
    match user_id {
        Some(user_id) if !may_assign_to(conn, actor, user_id)? => Err(ApiError::invalid(
            field,
            format!("User with ID {} is not available to you.", user_id),
        )),
        _ => Ok(()),
    }
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(status::routes());
    routes.extend(login::routes());
    routes.extend(user::routes());
    routes.extend(role::routes());
    routes.extend(industry::routes());
    routes.extend(plot::routes());
    routes.extend(farm::routes());
    routes.extend(task::routes());
    routes.extend(booking::routes());
    routes.extend(inventory::routes());
    routes.extend(vendor::routes());
    routes.extend(messaging::routes());
    routes
}
