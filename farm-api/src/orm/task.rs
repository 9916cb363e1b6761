use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewTask, Task, TaskChanges, TaskInput};
use crate::orm::last_insert_rowid;
use crate::schema::tasks;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_task(
    conn: &mut SqliteConnection,
    input: TaskInput,
    stamp: RecordStamp,
) -> QueryResult<Task> {
    let now = Utc::now().naive_utc();
    let new_task = NewTask {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(tasks::table)
        .values(&new_task)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    tasks::table.find(id).first(conn)
}

pub fn list_tasks(conn: &mut SqliteConnection, scope: &TenantScope) -> QueryResult<Vec<Task>> {
    let Some(query) = scoped_query!(scope, tasks, assigned_to) else {
        return Ok(Vec::new());
    };
    query.order(tasks::id.asc()).load(conn)
}

pub fn get_task(
    conn: &mut SqliteConnection,
    task_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Task>> {
    let task: Option<Task> = tasks::table.find(task_id).first(conn).optional()?;
    Ok(task.filter(|t| scope.permits(t)))
}

pub fn update_task(
    conn: &mut SqliteConnection,
    task_id: i32,
    mut changes: TaskChanges,
) -> QueryResult<Task> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(tasks::table.find(task_id))
        .set(&changes)
        .execute(conn)?;
    tasks::table.find(task_id).first(conn)
}

pub fn delete_task(conn: &mut SqliteConnection, task_id: i32) -> QueryResult<usize> {
    diesel::delete(tasks::table.find(task_id)).execute(conn)
}
