//! JSON error responses.
//!
//! Every error leaves the server as
//!
//! ```json
//! {"detail": "...", "error_code": "NOT_FOUND", "error_type": "NotFound", "status": 404}
//! ```
//!
//! with an additional `errors` object for field validation failures.
//! Handlers return [`ApiError`]; the catchers in `lib.rs` produce the same
//! shape for failures that never reach a handler.

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, status::Custom};
use rocket::serde::json::{Json, Value, json};
use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Invalid phone number or password")]
    InvalidCredentials,
    #[error("User account is deactivated.")]
    AccountDeactivated,
    #[error("Token is invalid or expired")]
    InvalidToken,
    #[error("Token has been revoked")]
    RevokedToken,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            _ => "AUTHENTICATION_FAILED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{detail}")]
    BadRequest { detail: String, code: &'static str },
    #[error("Invalid input.")]
    Validation(FieldErrors),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(code: &'static str, detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            detail: detail.into(),
            code,
        }
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        ApiError::Forbidden(detail.into())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found.", what))
    }

    /// A single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        ApiError::Validation(errors)
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest { .. } | ApiError::Validation(_) => Status::BadRequest,
            ApiError::Auth(_) => Status::Unauthorized,
            ApiError::Forbidden(_) => Status::Forbidden,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Database(_) | ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } => *code,
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth(e) => e.error_code(),
            ApiError::Forbidden(_) => "PERMISSION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Database(_) | ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BadRequest",
            ApiError::Validation(_) => "ValidationError",
            ApiError::Auth(_) => "AuthenticationFailed",
            ApiError::Forbidden(_) => "PermissionDenied",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Database(_) => "DatabaseError",
            ApiError::Internal(_) => "InternalError",
        }
    }

    pub fn to_json(&self) -> Value {
        // Internal details stay in the log.
        let detail = match self {
            ApiError::Database(_) | ApiError::Internal(_) => {
                "An unexpected error occurred.".to_string()
            }
            other => other.to_string(),
        };
        let mut body = error_body(self.status(), &detail, self.error_code(), self.error_type());
        if let ApiError::Validation(errors) = self {
            body["errors"] = json!(errors.0);
        }
        body
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match e {
            Error::NotFound => ApiError::NotFound("Not found.".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ApiError::Conflict(format!("Already exists: {}", info.message()))
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                ApiError::bad_request("INVALID_REFERENCE", "A referenced record does not exist.")
            }
            other => ApiError::Database(other),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ApiError::Database(e) => error!("{} {}: database error: {}", req.method(), req.uri(), e),
            ApiError::Internal(e) => error!("{} {}: {}", req.method(), req.uri(), e),
            other => info!("{} {} -> {}", req.method(), req.uri(), other.error_code()),
        }
        Custom(self.status(), Json(self.to_json())).respond_to(req)
    }
}

/// Shared body for handler errors and catchers.
pub fn error_body(status: Status, detail: &str, error_code: &str, error_type: &str) -> Value {
    json!({
        "detail": detail,
        "error_code": error_code,
        "error_type": error_type,
        "status": status.code,
    })
}

pub type ApiResult<T> = Result<T, ApiError>;
