//! Password hashing and credential checks.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{ApiError, AuthError};
use crate::models::{Role, User};
use crate::orm::DbRunner;
use crate::orm::user::{get_user_by_phone, get_user_with_role};

/// Argon2 hash with a random salt, in PHC string form.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        warn!("Stored password hash is not in PHC format");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Checks a normalized phone number and password.
///
/// Unknown numbers and wrong passwords fail identically. A correct password
/// on a deactivated account reports the deactivation.
pub async fn authenticate<D: DbRunner>(
    db: &D,
    phone: &str,
    password: &str,
) -> Result<(User, Option<Role>), ApiError> {
    let phone = phone.to_owned();
    let found = db
        .run(move |conn| -> diesel::QueryResult<_> {
            let Some(user) = get_user_by_phone(conn, &phone)? else {
                return Ok(None);
            };
            get_user_with_role(conn, user.id)
        })
        .await?;

    let Some((user, role)) = found else {
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }
    if !user.is_active {
        return Err(AuthError::AccountDeactivated.into());
    }
    Ok((user, role))
}
