use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{IndustrySummary, Role};
use crate::schema::users;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, TS)]
#[diesel(table_name = users)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub username: String, // Will be unique
    pub phone_number: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub is_superuser: bool,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Everything needed to create a user except timestamps.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub is_superuser: bool,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A user as the API returns it: role and industry resolved, no password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub industry: Option<IndustrySummary>,
    pub created_by: Option<i32>,
    pub is_superuser: bool,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl UserResponse {
    pub fn new(user: &User, role: Option<Role>, industry: Option<IndustrySummary>) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role,
            industry,
            created_by: user.created_by,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
