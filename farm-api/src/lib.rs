#[macro_use]
extern crate rocket;

use rocket::figment::value::{Map, Value};
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::{Json, Value as JsonValue};
use rocket::{Build, Rocket};

pub mod admin_init_fairing;
pub mod api;
pub mod auth_guards;
pub mod config;
pub mod error;
pub mod logged_json;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod tenancy;
pub mod token;
pub mod validation;

#[cfg(test)]
pub mod generate_types;

use auth_guards::AuthFailure;
use error::{AuthError, error_body};

fn catcher_body(status: Status, detail: &str, code: &str, error_type: &str) -> Json<JsonValue> {
    Json(error_body(status, detail, code, error_type))
}

#[catch(400)]
fn bad_request(_req: &Request) -> Json<JsonValue> {
    catcher_body(
        Status::BadRequest,
        "The request could not be understood.",
        "BAD_REQUEST",
        "BadRequest",
    )
}

/// Reports why the authentication guard gave up, when it recorded a reason.
#[catch(401)]
fn unauthorized(req: &Request) -> Json<JsonValue> {
    let failure = req.local_cache(|| AuthFailure(None));
    let error = failure.0.clone().unwrap_or(AuthError::MissingCredentials);
    catcher_body(
        Status::Unauthorized,
        &error.to_string(),
        error.error_code(),
        "AuthenticationFailed",
    )
}

#[catch(403)]
fn forbidden(_req: &Request) -> Json<JsonValue> {
    catcher_body(
        Status::Forbidden,
        "You do not have permission to perform this action.",
        "PERMISSION_DENIED",
        "PermissionDenied",
    )
}

#[catch(404)]
fn not_found(req: &Request) -> Json<JsonValue> {
    catcher_body(
        Status::NotFound,
        &format!("No route for {}", req.uri().path()),
        "NOT_FOUND",
        "NotFound",
    )
}

#[catch(409)]
fn conflict(_req: &Request) -> Json<JsonValue> {
    catcher_body(Status::Conflict, "Conflict.", "CONFLICT", "Conflict")
}

/// Malformed JSON bodies and unknown choice values land here.
#[catch(422)]
fn unprocessable_entity(_req: &Request) -> Json<JsonValue> {
    catcher_body(
        Status::UnprocessableEntity,
        "The request body is malformed or has invalid values.",
        "VALIDATION_ERROR",
        "ValidationError",
    )
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<JsonValue> {
    error!("Unhandled server error on {} {}", req.method(), req.uri());
    catcher_body(
        Status::InternalServerError,
        "An unexpected error occurred.",
        "INTERNAL_SERVER_ERROR",
        "InternalError",
    )
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<JsonValue> {
    let reason = status.reason().unwrap_or("Unknown Error");
    let code = reason.to_ascii_uppercase().replace([' ', '-'], "_");
    catcher_body(status, reason, &code, "HttpError")
}

pub fn register_catchers(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.register(
        "/",
        catchers![
            bad_request,
            unauthorized,
            forbidden,
            not_found,
            conflict,
            unprocessable_entity,
            internal_server_error,
            default_catcher
        ],
    )
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", api::routes())
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(_, url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// The configuration the server launches with: `Rocket.toml`, `ROCKET_*`
/// variables, then `DATABASE_URL` and `FARM_JWT_SECRET` when set.
pub fn figment() -> Figment {
    let mut figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global());

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        figment = figment.merge(("databases.sqlite_db.url", database_url));
    }
    if let Ok(secret) = std::env::var("FARM_JWT_SECRET") {
        figment = figment.merge(("auth.jwt_secret", secret));
    }
    figment
}

/// Note that this function doesn't get tested by our tests. Tests build
/// their own instance with `orm::testing::test_rocket`.
#[launch]
pub fn rocket() -> Rocket<Build> {
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let rocket = rocket::custom(figment())
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .attach(config::auth_config_fairing())
        .attach(admin_init_fairing::admin_init_fairing());

    log_rocket_info(&rocket);

    register_catchers(mount_api_routes(rocket))
}
