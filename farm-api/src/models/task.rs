use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::tasks;
use crate::tenancy::OwnedEntity;
use crate::text_enum;

text_enum! {
    pub enum TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = tasks)]
#[ts(export)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[ts(type = "string | null")]
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Task {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }

    fn owning_user(&self) -> Option<i32> {
        self.assigned_to
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = tasks)]
#[ts(export)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    #[ts(type = "string | null")]
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i32>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    #[diesel(embed)]
    pub input: TaskInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = tasks)]
#[ts(export)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[ts(type = "string | null")]
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i32>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}
