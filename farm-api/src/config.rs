//! Authentication settings read from the Rocket figment.
//!
//! ```toml
//! [default.auth]
//! jwt_secret = "change-me"
//! access_token_minutes = 60
//! refresh_token_days = 7
//! issuer = "farm-api"
//! ```
//!
//! `FARM_JWT_SECRET` in the environment overrides `auth.jwt_secret`.

use chrono::Duration;
use rocket::fairing::AdHoc;
use serde::Deserialize;

/// Longest accepted access token lifetime, one week.
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 7 * 24 * 60;
/// Longest accepted refresh token lifetime.
pub const MAX_REFRESH_TOKEN_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_access_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_refresh_days")]
    pub refresh_token_days: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl AuthConfig {
    /// Rejects an empty secret and lifetimes outside `1..=MAX`.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.trim().is_empty() {
            return Err("auth.jwt_secret must not be empty".to_string());
        }
        if !(1..=MAX_ACCESS_TOKEN_MINUTES).contains(&self.access_token_minutes) {
            return Err(format!(
                "auth.access_token_minutes must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_MINUTES, self.access_token_minutes
            ));
        }
        if !(1..=MAX_REFRESH_TOKEN_DAYS).contains(&self.refresh_token_days) {
            return Err(format!(
                "auth.refresh_token_days must be between 1 and {}, got {}",
                MAX_REFRESH_TOKEN_DAYS, self.refresh_token_days
            ));
        }
        Ok(())
    }

    /// Clamped into the accepted range, so it always fits a timestamp.
    pub fn access_lifetime(&self) -> Duration {
        Duration::minutes(self.access_token_minutes.clamp(1, MAX_ACCESS_TOKEN_MINUTES))
    }

    /// Clamped into the accepted range, so it always fits a timestamp.
    pub fn refresh_lifetime(&self) -> Duration {
        Duration::days(self.refresh_token_days.clamp(1, MAX_REFRESH_TOKEN_DAYS))
    }
}

fn default_access_minutes() -> i64 {
    60
}

fn default_refresh_days() -> i64 {
    7
}

fn default_issuer() -> String {
    "farm-api".to_string()
}

/// Extracts [`AuthConfig`] from the `auth` table and manages it as state.
/// Ignition fails when the secret is missing or a lifetime is out of range.
pub fn auth_config_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Auth Configuration", |rocket| async {
        let config = match rocket.figment().extract_inner::<AuthConfig>("auth") {
            Ok(config) => config,
            Err(e) => {
                error!("Missing or invalid auth configuration: {}", e);
                return Err(rocket);
            }
        };
        if let Err(e) = config.validate() {
            error!("Invalid auth configuration: {}", e);
            return Err(rocket);
        }
        info!(
            "Auth configured: issuer={}, access={}m, refresh={}d",
            config.issuer, config.access_token_minutes, config.refresh_token_days
        );
        Ok(rocket.manage(config))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::error::ErrorKind;
    use rocket::figment::Figment;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "secret".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            issuer: "farm-api".to_string(),
        }
    }

    #[test]
    fn lifetimes_are_bounded() {
        assert!(config().validate().is_ok());

        for (minutes, days) in [(0, 7), (-5, 7), (i64::MAX, 7), (60, 0), (60, i64::MAX)] {
            let bad = AuthConfig {
                access_token_minutes: minutes,
                refresh_token_days: days,
                ..config()
            };
            assert!(bad.validate().is_err(), "{}m/{}d accepted", minutes, days);
            assert!(bad.access_lifetime() <= Duration::minutes(MAX_ACCESS_TOKEN_MINUTES));
            assert!(bad.refresh_lifetime() <= Duration::days(MAX_REFRESH_TOKEN_DAYS));
        }

        let blank = AuthConfig { jwt_secret: "  ".to_string(), ..config() };
        assert!(blank.validate().is_err());
    }

    #[rocket::async_test]
    async fn ignition_fails_on_absurd_lifetime() {
        let figment = Figment::from(rocket::Config::debug_default())
            .merge(("auth.jwt_secret", "secret"))
            .merge(("auth.access_token_minutes", i64::MAX));
        match rocket::custom(figment).attach(auth_config_fairing()).ignite().await {
            Ok(_) => panic!("ignited with an out-of-range access lifetime"),
            Err(error) => assert!(matches!(error.kind(), ErrorKind::FailedFairings(_))),
        }

        let figment = Figment::from(rocket::Config::debug_default())
            .merge(("auth.jwt_secret", "secret"));
        let rocket = rocket::custom(figment)
            .attach(auth_config_fairing())
            .ignite()
            .await
            .unwrap();
        assert_eq!(rocket.state::<AuthConfig>().unwrap().access_token_minutes, 60);
    }
}
