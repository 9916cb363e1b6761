//! Task endpoints.
//!
//! Everyone reads the tasks in their scope, which for farmers and field
//! officers includes tasks assigned to them. Creating, editing and deleting
//! tasks is for owners, managers and field officers.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::api::{CreateRequest, check_assignee, record_stamp};
use crate::auth_guards::{AuthenticatedUser, FieldStaffUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Task, TaskChanges, TaskInput};
use crate::orm::DbConn;
use crate::orm::task::{delete_task, get_task, insert_task, list_tasks, update_task};
use crate::tenancy::TenantScope;
use crate::validation::{FieldErrors, require_non_blank};

#[get("/tasks")]
pub async fn list_all(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Task>>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        Ok(Json(list_tasks(conn, &scope)?))
    })
    .await
}

#[post("/tasks", data = "<request>")]
pub async fn create_one(
    auth: FieldStaffUser,
    db: DbConn,
    request: LoggedJson<CreateRequest<TaskInput>>,
) -> ApiResult<status::Created<Json<Task>>> {
    let CreateRequest { input, industry_id } = request.into_inner();
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "title", &input.title);
    errors.into_result()?;

    let actor = auth.actor();
    let task = db
        .run(move |conn| -> ApiResult<_> {
            check_assignee(conn, &actor, "assigned_to", input.assigned_to)?;
            let stamp = record_stamp(conn, &actor, industry_id)?;
            Ok(insert_task(conn, input, stamp)?)
        })
        .await?;

    let location = format!("/api/tasks/{}", task.id);
    Ok(status::Created::new(location).body(Json(task)))
}

#[get("/tasks/<task_id>")]
pub async fn get_one(auth: AuthenticatedUser, db: DbConn, task_id: i32) -> ApiResult<Json<Task>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        get_task(conn, task_id, &scope)?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Task"))
    })
    .await
}

#[put("/tasks/<task_id>", data = "<changes>")]
pub async fn update_one(
    auth: FieldStaffUser,
    db: DbConn,
    task_id: i32,
    changes: LoggedJson<TaskChanges>,
) -> ApiResult<Json<Task>> {
    let changes = changes.into_inner();
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_task(conn, task_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Task"));
        }
        check_assignee(conn, &actor, "assigned_to", changes.assigned_to)?;
        Ok(Json(update_task(conn, task_id, changes)?))
    })
    .await
}

#[delete("/tasks/<task_id>")]
pub async fn delete_one(
    auth: FieldStaffUser,
    db: DbConn,
    task_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let scope = TenantScope::resolve(conn, &actor)?;
        if get_task(conn, task_id, &scope)?.is_none() {
            return Err(ApiError::not_found("Task"));
        }
        delete_task(conn, task_id)?;
        Ok(status::NoContent)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_all, create_one, get_one, update_one, delete_one]
}
