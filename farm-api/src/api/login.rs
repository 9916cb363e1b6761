//! Phone-number login, token refresh and logout.

use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth_guards::AuthenticatedUser;
use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult, AuthError};
use crate::logged_json::LoggedJson;
use crate::models::UserResponse;
use crate::orm::DbConn;
use crate::orm::login::authenticate;
use crate::orm::logout::{expiry_from_claim, is_revoked, purge_expired, revoke_token};
use crate::orm::user::{get_user, to_response};
use crate::token::{TokenKind, decode_token, issue_pair, issue_token};
use crate::validation::normalize_phone;

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DetailResponse {
    pub detail: String,
}

/// Login endpoint.
///
/// - **URL:** `/api/users/login`
/// - **Method:** `POST`
/// - **Authentication:** None
///
/// ```json
/// {"phone_number": "+91 98765 43210", "password": "secret"}
/// ```
///
/// The number is reduced to 10 digits before lookup. Responds with an
/// access/refresh token pair and the user, including role and industry.
#[post("/users/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    config: &State<AuthConfig>,
    login: LoggedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let login = login.into_inner();
    let (Some(phone), Some(password)) = (
        login.phone_number.filter(|p| !p.trim().is_empty()),
        login.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "Phone number and password are required",
        ));
    };

    let Some(phone) = normalize_phone(&phone) else {
        return Err(ApiError::bad_request(
            "INVALID_PHONE_FORMAT",
            "Phone number must be exactly 10 digits (or 12 digits with +91)",
        ));
    };

    let (user, _role) = authenticate(&db, &phone, &password).await?;
    let tokens = issue_pair(config, user.id)?;
    info!("User {} logged in", user.id);

    let user = db.run(move |conn| to_response(conn, &user)).await?;
    Ok(Json(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        user,
    }))
}

/// Exchanges a refresh token for a new access token.
#[post("/users/token/refresh", data = "<request>")]
pub async fn refresh(
    db: DbConn,
    config: &State<AuthConfig>,
    request: Json<RefreshRequest>,
) -> ApiResult<Json<AccessResponse>> {
    let claims = decode_token(config, &request.refresh, TokenKind::Refresh)?;

    let jti = claims.jti.clone();
    let user_id = claims.user_id;
    let (revoked, user) = db
        .run(move |conn| -> diesel::QueryResult<_> {
            Ok((is_revoked(conn, &jti)?, get_user(conn, user_id)?))
        })
        .await?;

    if revoked {
        return Err(AuthError::RevokedToken.into());
    }
    match user {
        Some(user) if user.is_active => {}
        Some(_) => return Err(AuthError::AccountDeactivated.into()),
        None => return Err(AuthError::InvalidToken.into()),
    }

    Ok(Json(AccessResponse {
        access: issue_token(config, user_id, TokenKind::Access)?,
    }))
}

/// Revokes the caller's refresh token.
///
/// - **URL:** `/api/users/logout`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// The refresh token must belong to the caller. Later refresh attempts with
/// it fail with `AUTHENTICATION_FAILED`; access tokens already issued stay
/// valid until they expire.
#[post("/users/logout", data = "<request>")]
pub async fn logout(
    auth: AuthenticatedUser,
    db: DbConn,
    config: &State<AuthConfig>,
    request: Json<RefreshRequest>,
) -> ApiResult<Json<DetailResponse>> {
    let claims = decode_token(config, &request.refresh, TokenKind::Refresh).map_err(|_| {
        ApiError::bad_request("INVALID_TOKEN", "Refresh token is invalid or expired")
    })?;
    if claims.user_id != auth.user.id {
        return Err(ApiError::bad_request(
            "INVALID_TOKEN",
            "Refresh token does not belong to the current user",
        ));
    }

    let expires_at = expiry_from_claim(claims.exp);
    db.run(move |conn| -> diesel::QueryResult<()> {
        revoke_token(conn, &claims.jti, claims.user_id, expires_at)?;
        let purged = purge_expired(conn)?;
        if purged > 0 {
            debug!("Purged {} expired token revocations", purged);
        }
        Ok(())
    })
    .await?;

    info!("User {} logged out", auth.user.id);
    Ok(Json(DetailResponse {
        detail: "Successfully logged out.".to_string(),
    }))
}

pub fn routes() -> Vec<Route> {
    routes![login, refresh, logout]
}
