use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, check_assignee, record_stamp};
use crate::auth_guards::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Farm, FarmChanges, FarmInput};
use crate::orm::DbConn;
use crate::orm::farm::{delete_farm, get_farm, insert_farm, list_farms, update_farm};
use crate::orm::plot::get_plot;
use crate::tenancy::TenantScope;

fn check_area(area_size: Option<f64>) -> ApiResult<()> {
    match area_size {
        Some(area) if !area.is_finite() || area < 0.0 => {
            Err(ApiError::invalid("area_size", "Area must be a non-negative number."))
        }
        _ => Ok(()),
    }
}

#[get("/farms")]
pub async fn list_all(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Farm>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_farms(conn, &scope)?))
    })
    .await
}

/// Create Farm endpoint.
///
/// `farm_uid` is generated. A `plot_id` must name a plot the caller can see.
#[post("/farms", data = "<request>")]
pub async fn create_one(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<FarmInput>>,
) -> ApiResult<status::Created<Json<Farm>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    check_area(Some(input.area_size))?;

    let actor = auth.actor();
    let farm = db
        .run(move |conn| -> ApiResult<_> {
            let scope = TenantScope::resolve(conn, &actor)?;
            if let Some(plot_id) = input.plot_id {
                if get_plot(conn, plot_id, &scope)?.is_none() {
                    return Err(ApiError::invalid("plot_id", "Plot not found."));
                }
            }
            check_assignee(conn, &actor, "farm_owner_id", input.farm_owner_id)?;
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_farm(conn, input, stamp)?)
        })
        .await?;

    info!("User {} created farm {}", auth.user.id, farm.farm_uid);
    let location = format!("/api/farms/{}", farm.id);
    Ok(status::Created::new(location).body(Json(farm)))
}

#[get("/farms/<farm_id>")]
pub async fn get_one(auth: AuthenticatedUser, db: DbConn, farm_id: i32) -> ApiResult<Json<Farm>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_farm(conn, farm_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Farm"))
    })
    .await
}

#[put("/farms/<farm_id>", data = "<changes>")]
pub async fn update_one(
    auth: AuthenticatedUser,
    db: DbConn,
    farm_id: i32,
    changes: LoggedJson<FarmChanges>,
) -> ApiResult<Json<Farm>> {
    let changes = changes.into_inner();
    check_area(changes.area_size)?;

    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_farm(conn, farm_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Farm"));
        }
        if let Some(plot_id) = changes.plot_id {
            if get_plot(conn, plot_id, &scope)?.is_none() {
                return Err(ApiError::invalid("plot_id", "Plot not found."));
            }
        }
        check_assignee(conn, &actor, "farm_owner_id", changes.farm_owner_id)?;
        Ok(Json(update_farm(conn, farm_id, changes)?))
    })
    .await
}

#[delete("/farms/<farm_id>")]
pub async fn delete_one(
    auth: AuthenticatedUser,
    db: DbConn,
    farm_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_farm(conn, farm_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Farm"));
        }
        delete_farm(conn, farm_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_all, create_one, get_one, update_one, delete_one]
}
