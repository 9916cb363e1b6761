use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};

use crate::schema::revoked_tokens;

/// A refresh token that can no longer be exchanged, keyed by its `jti`.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = revoked_tokens)]
pub struct RevokedToken {
    pub jti: String,
    pub user_id: i32,
    pub expires_at: NaiveDateTime,
    pub revoked_at: NaiveDateTime,
}
