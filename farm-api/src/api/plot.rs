//! Plot endpoints. Any authenticated user may record plots; the `farmer`
//! must be someone the caller can see.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, check_assignee, record_stamp};
use crate::auth_guards::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Plot, PlotChanges, PlotInput};
use crate::orm::DbConn;
use crate::orm::plot::{delete_plot, get_plot, insert_plot, list_plots, update_plot};
use crate::tenancy::TenantScope;
use crate::validation::{FieldErrors, require_non_blank};

#[get("/plots")]
pub async fn list_all(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Plot>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_plots(conn, &scope)?))
    })
    .await
}

/// Create Plot endpoint.
///
/// - **URL:** `/api/plots`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// ```json
/// {"gat_number": "112", "village": "Baramati", "farmer_id": 7}
/// ```
#[post("/plots", data = "<request>")]
pub async fn create_one(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<PlotInput>>,
) -> ApiResult<status::Created<Json<Plot>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "gat_number", &input.gat_number);
    errors.into_result()?;

    let actor = auth.actor();
    let plot = db
        .run(move |conn| -> ApiResult<_> {
            check_assignee(conn, &actor, "farmer_id", input.farmer_id)?;
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_plot(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/plots/{}", plot.id);
    Ok(status::Created::new(location).body(Json(plot)))
}

#[get("/plots/<plot_id>")]
pub async fn get_one(auth: AuthenticatedUser, db: DbConn, plot_id: i32) -> ApiResult<Json<Plot>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_plot(conn, plot_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Plot"))
    })
    .await
}

#[put("/plots/<plot_id>", data = "<changes>")]
pub async fn update_one(
    auth: AuthenticatedUser,
    db: DbConn,
    plot_id: i32,
    changes: LoggedJson<PlotChanges>,
) -> ApiResult<Json<Plot>> {
    let changes = changes.into_inner();
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_plot(conn, plot_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Plot"));
        }
        check_assignee(conn, &actor, "farmer_id", changes.farmer_id)?;
        Ok(Json(update_plot(conn, plot_id, changes)?))
    })
    .await
}

#[delete("/plots/<plot_id>")]
pub async fn delete_one(
    auth: AuthenticatedUser,
    db: DbConn,
    plot_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_plot(conn, plot_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Plot"));
        }
        delete_plot(conn, plot_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_all, create_one, get_one, update_one, delete_one]
}
