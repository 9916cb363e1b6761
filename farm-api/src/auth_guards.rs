//! Bearer-token authentication and role guards for Rocket routes.
//!
//! ```rust,ignore
//! #[get("/profile")]
//! fn profile(auth: AuthenticatedUser) -> String {
//!     format!("Hello, {}", auth.user.username)
//! }
//!
//! #[post("/vendors", data = "<vendor>")]
//! async fn create_vendor(auth: OwnerOrManagerUser, ...) { ... }
//! ```
//!
//! A failed guard answers 401 (no usable token) or 403 (wrong role). The
//! reason is left in the request-local cache so the 401 catcher can report
//! it.

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use rocket::State;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{Role, RoleKind, User};
use crate::orm::DbConn;
use crate::orm::user::get_user_with_role;
use crate::tenancy::Actor;
use crate::token::{TokenKind, decode_token};

/// The reason the last authentication guard on this request failed.
#[derive(Debug, Clone, Default)]
pub struct AuthFailure(pub Option<AuthError>);

fn fail<T>(request: &Request<'_>, error: AuthError) -> request::Outcome<T, AuthError> {
    request.local_cache(|| AuthFailure(Some(error.clone())));
    Outcome::Error((Status::Unauthorized, error))
}

fn bearer_token<'a>(request: &'a Request<'_>) -> Option<&'a str> {
    let header = request.headers().get_one("Authorization")?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// A request guard for routes that require a logged-in, active user.
///
/// Checks, in order: an `Authorization: Bearer` header is present, the token
/// is a valid access token for this server, the user still exists, and the
/// account is active.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub role: Option<Role>,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::new(&self.user, self.role.as_ref())
    }

    /// True for a Global Admin or a holder of any listed role.
    pub fn has_any_role(&self, allowed: &[RoleKind]) -> bool {
        self.actor().has_any_role(allowed)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(token) = bearer_token(request) else {
            return fail(request, AuthError::MissingCredentials);
        };

        let config = match request.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            _ => {
                error!("AuthConfig is not managed; cannot verify tokens");
                return Outcome::Error((Status::InternalServerError, AuthError::InvalidToken));
            }
        };

        let claims = match decode_token(config, token, TokenKind::Access) {
            Ok(claims) => claims,
            Err(e) => return fail(request, e),
        };

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, AuthError::InvalidToken)),
        };

        let user_id = claims.user_id;
        let (user, role) = match db.run(move |conn| get_user_with_role(conn, user_id)).await {
            Ok(Some(found)) => found,
            Ok(None) => return fail(request, AuthError::InvalidToken),
            Err(e) => {
                error!("Database error loading user {}: {:?}", user_id, e);
                return Outcome::Error((Status::InternalServerError, AuthError::InvalidToken));
            }
        };

        if !user.is_active {
            return fail(request, AuthError::AccountDeactivated);
        }

        Outcome::Success(AuthenticatedUser { user, role })
    }
}

/// Defines a guard admitting Global Admins and the listed roles.
macro_rules! create_role_guard {
    ($(#[$meta:meta])* $name:ident, [$($role:expr),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthenticatedUser);

        impl std::ops::Deref for $name {
            type Target = AuthenticatedUser;

            fn deref(&self) -> &AuthenticatedUser {
                &self.0
            }
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = AuthError;

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                if auth_user.has_any_role(&[$($role),*]) {
                    Outcome::Success($name(auth_user))
                } else {
                    Outcome::Error((Status::Forbidden, AuthError::InvalidToken))
                }
            }
        }
    };
}

create_role_guard!(OwnerUser, [RoleKind::Owner]);
create_role_guard!(OwnerOrManagerUser, [RoleKind::Owner, RoleKind::Manager]);
create_role_guard!(
    /// Owners, managers and field officers.
    FieldStaffUser,
    [RoleKind::Owner, RoleKind::Manager, RoleKind::FieldOfficer]
);
create_role_guard!(
    /// Only `is_superuser` accounts.
    GlobalAdminUser,
    []
);
