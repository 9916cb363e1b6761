//! Role listing. The four roles are seeded by migration and never change at
//! runtime.

use rocket::Route;
use rocket::serde::json::Json;

use crate::auth_guards::AuthenticatedUser;
use crate::error::ApiResult;
use crate::models::Role;
use crate::orm::DbConn;
use crate::orm::role::list_roles;

/// List Roles endpoint.
///
/// - **URL:** `/api/roles`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// ```json
/// [{"id": 1, "name": "owner", "display_name": "Owner"}, ...]
/// ```
#[get("/roles")]
pub async fn list_all(_auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(db.run(list_roles).await?))
}

pub fn routes() -> Vec<Route> {
    routes![list_all]
}
