//! Refresh-token revocation.
//!
//! Logout records the refresh token's `jti`; refresh requests carrying a
//! recorded `jti` are refused until the token would have expired anyway.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::models::RevokedToken;
use crate::schema::revoked_tokens;

/// Records `jti` as revoked. Revoking twice is not an error.
pub fn revoke_token(
    conn: &mut SqliteConnection,
    jti: &str,
    user_id: i32,
    expires_at: NaiveDateTime,
) -> QueryResult<usize> {
    diesel::insert_or_ignore_into(revoked_tokens::table)
        .values(&RevokedToken {
            jti: jti.to_string(),
            user_id,
            expires_at,
            revoked_at: Utc::now().naive_utc(),
        })
        .execute(conn)
}

pub fn is_revoked(conn: &mut SqliteConnection, jti: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        revoked_tokens::table.filter(revoked_tokens::jti.eq(jti)),
    ))
    .get_result(conn)
}

/// Drops revocations whose tokens have expired.
pub fn purge_expired(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::delete(revoked_tokens::table.filter(revoked_tokens::expires_at.lt(Utc::now().naive_utc())))
        .execute(conn)
}

/// Token `exp` claim as a naive UTC timestamp.
pub fn expiry_from_claim(exp: i64) -> NaiveDateTime {
    DateTime::from_timestamp(exp, 0)
        .unwrap_or_else(Utc::now)
        .naive_utc()
}
