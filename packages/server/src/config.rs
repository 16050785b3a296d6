use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Server configuration, read once at startup.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub session_secret: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub auth_redirect_uri: String,
    pub frontend_origin: String,
    pub post_login_redirect: String,
    pub login_failure_redirect: String,
}

impl Config {
    pub fn load() -> Self {
        let config = Self {
            port: try_load("PORT", "3000"),
            database_url: require("DATABASE_URL"),
            session_secret: require("SESSION_SECRET"),
            google_client_id: require("GOOGLE_CLIENT_ID"),
            google_client_secret: require("GOOGLE_CLIENT_SECRET"),
            auth_redirect_uri: try_load(
                "AUTH_REDIRECT_URI",
                "http://localhost:3000/auth/login/callback",
            ),
            frontend_origin: try_load("FRONTEND_ORIGIN", "http://localhost:5173"),
            post_login_redirect: try_load("POST_LOGIN_REDIRECT", "/"),
            login_failure_redirect: try_load("LOGIN_FAILURE_REDIRECT", "/login"),
        };

        // The signing key derivation needs real entropy to work with.
        assert!(
            config.session_secret.len() >= 32,
            "SESSION_SECRET must be at least 32 bytes"
        );

        config
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn require(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
