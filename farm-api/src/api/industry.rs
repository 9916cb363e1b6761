//! Industry endpoints.
//!
//! Any authenticated user may read the industries visible to them: a Global
//! Admin sees all of them, everyone else only their own. Writes are limited
//! to Global Admins.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::auth_guards::{AuthenticatedUser, GlobalAdminUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Industry, IndustryChanges, IndustryInput};
use crate::orm::DbConn;
use crate::orm::industry::{
    delete_industry, get_industry, get_industry_by_name, insert_industry, list_industries,
    update_industry,
};
use crate::validation::{FieldErrors, require_non_blank};

#[get("/industries")]
pub async fn list_all(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Industry>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        if actor.is_superuser {
            return Ok(Json(list_industries(conn)?));
        }
        let own = match actor.industry_id {
            Some(id) => get_industry(conn, id)?.into_iter().collect(),
            None => Vec::new(),
        };
        Ok(Json(own))
    })
    .await
}

/// Create Industry endpoint.
///
/// - **URL:** `/api/industries`
/// - **Method:** `POST`
/// - **Authorization:** Global Admin
///
/// Names are unique; a duplicate answers 409.
#[post("/industries", data = "<input>")]
pub async fn create_one(
    auth: GlobalAdminUser,
    db: DbConn,
    input: LoggedJson<IndustryInput>,
) -> ApiResult<status::Created<Json<Industry>>> {
    let mut input = input.into_inner();
    input.name = input.name.trim().to_string();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "name", &input.name);
    errors.into_result()?;

    let industry = db
        .run(move |conn| -> ApiResult<_> {
            if get_industry_by_name(conn, &input.name)?.is_some() {
                return Err(ApiError::Conflict(format!(
                    "Industry '{}' already exists.",
                    input.name
                )));
            }
            Ok(insert_industry(conn, input)?)
        })
        .await?;

    info!("User {} created industry {} ({})", auth.user.id, industry.id, industry.name);
    let location = format!("/api/industries/{}", industry.id);
    Ok(status::Created::new(location).body(Json(industry)))
}

#[get("/industries/<industry_id>")]
pub async fn get_one(auth: AuthenticatedUser, db: DbConn, industry_id: i32) -> ApiResult<Json<Industry>> {
    let actor = auth.actor();
    if !actor.is_superuser && actor.industry_id != Some(industry_id) {
        return Err(ApiError::not_found("Industry"));
    }
    db.run(move |conn| get_industry(conn, industry_id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Industry"))
}

#[put("/industries/<industry_id>", data = "<changes>")]
pub async fn update_one(
    _auth: GlobalAdminUser,
    db: DbConn,
    industry_id: i32,
    changes: LoggedJson<IndustryChanges>,
) -> ApiResult<Json<Industry>> {
    let changes = changes.into_inner();
    if let Some(name) = &changes.name {
        let mut errors = FieldErrors::new();
        require_non_blank(&mut errors, "name", name);
        errors.into_result()?;
    }
    db.run(move |conn| -> ApiResult<_> {
        if get_industry(conn, industry_id)?.is_none() {
            return Err(ApiError::not_found("Industry"));
        }
        Ok(Json(update_industry(conn, industry_id, changes)?))
    })
    .await
}

/// Records in the industry survive with their industry cleared.
#[delete("/industries/<industry_id>")]
pub async fn delete_one(
    auth: GlobalAdminUser,
    db: DbConn,
    industry_id: i32,
) -> ApiResult<status::NoContent> {
    match db.run(move |conn| delete_industry(conn, industry_id)).await? {
        0 => Err(ApiError::not_found("Industry")),
        _ => {
            info!("User {} deleted industry {}", auth.user.id, industry_id);
            Ok(status::NoContent)
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![list_all, create_one, get_one, update_one, delete_one]
}
