//! A `Json<T>` data guard that logs the parsed body.
//!
//! Values of `password`-like keys are replaced before logging.

use rocket::serde::json::{Json, Value};
use rocket::serde::{Deserialize, Serialize};
use rocket::{
    Data, Request,
    data::{self, FromData},
};

pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for LoggedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

const REDACTED: &str = "********";

/// Blanks every object member whose key mentions a password or token.
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, member) in map.iter_mut() {
                let key = key.to_ascii_lowercase();
                if key.contains("password") || key == "refresh" || key == "access" {
                    *member = Value::String(REDACTED.to_string());
                } else {
                    redact(member);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// The redacted JSON form of a request body, as it is logged.
pub fn redacted_body<T: Serialize>(body: &T) -> Option<String> {
    let mut value = serde_json::to_value(body).ok()?;
    redact(&mut value);
    Some(value.to_string())
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            data::Outcome::Success(json_data) => {
                info!(
                    "API Request Body: {} {} | Data: {}",
                    req.method().as_str(),
                    req.uri().path(),
                    redacted_body(&json_data.0).unwrap_or_else(|| "<failed to serialize>".to_string())
                );
                data::Outcome::Success(LoggedJson(json_data.into_inner()))
            }
            data::Outcome::Error(e) => data::Outcome::Error(e),
            data::Outcome::Forward(f) => data::Outcome::Forward(f),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LoggedJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
