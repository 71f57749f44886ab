//! Application settings loaded from environment variables.

use std::env;
use std::ops::RangeInclusive;

use chrono::Duration;

use super::constants::{
    COOKIE_TRUST_SECONDS_RANGE, DEFAULT_COOKIE_NAME_LENGTH, DEFAULT_COOKIE_TRUST_SECONDS,
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_REMEMBER_DAYS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_TTL_MINUTES,
    MIN_COOKIE_SECRET_LENGTH, REMEMBER_DAYS_RANGE, SESSION_TTL_MINUTES_RANGE,
};

/// Insecure development secrets. Never used in release builds.
const DEV_VAULT_KEY: &str = "ZGV2LXZhdWx0LWtleS1kby1ub3QtdXNlLWluLXByb2Q=";
const DEV_COOKIE_SECRET: &str = "dev-cookie-secret-minimum-32-chars!!";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    vault_key: String,
    cookie_secret: String,
    pub session_ttl_minutes: i64,
    pub cookie_trust_seconds: i64,
    pub remember_days: i64,
    pub cookie_name_length: usize,
    pub secure_cookies: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("vault_key", &"[REDACTED]")
            .field("cookie_secret", &"[REDACTED]")
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("cookie_trust_seconds", &self.cookie_trust_seconds)
            .field("remember_days", &self.remember_days)
            .field("cookie_name_length", &self.cookie_name_length)
            .field("secure_cookies", &self.secure_cookies)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Build a configuration from explicit secrets, with defaults for everything else.
    ///
    /// Intended for embedding the library and for tests; no environment is read.
    pub fn new(
        database_url: impl Into<String>,
        vault_key: impl Into<String>,
        cookie_secret: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            vault_key: vault_key.into(),
            cookie_secret: cookie_secret.into(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            cookie_trust_seconds: DEFAULT_COOKIE_TRUST_SECONDS,
            remember_days: DEFAULT_REMEMBER_DAYS,
            cookie_name_length: DEFAULT_COOKIE_NAME_LENGTH,
            secure_cookies: true,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if VAULT_KEY or COOKIE_SECRET is missing in a release build,
    /// if COOKIE_SECRET is too short, or if a duration setting is out of range.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let vault_key = secret_from_env("VAULT_KEY", DEV_VAULT_KEY);
        let cookie_secret = secret_from_env("COOKIE_SECRET", DEV_COOKIE_SECRET);

        if cookie_secret.len() < MIN_COOKIE_SECRET_LENGTH {
            panic!(
                "COOKIE_SECRET must be at least {} characters long",
                MIN_COOKIE_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parsed_env("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            vault_key,
            cookie_secret,
            session_ttl_minutes: bounded(
                "SESSION_TTL_MINUTES",
                parsed_env("SESSION_TTL_MINUTES").unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
                SESSION_TTL_MINUTES_RANGE,
            ),
            cookie_trust_seconds: bounded(
                "COOKIE_TRUST_SECONDS",
                parsed_env("COOKIE_TRUST_SECONDS").unwrap_or(DEFAULT_COOKIE_TRUST_SECONDS),
                COOKIE_TRUST_SECONDS_RANGE,
            ),
            remember_days: bounded(
                "REMEMBER_DAYS",
                parsed_env("REMEMBER_DAYS").unwrap_or(DEFAULT_REMEMBER_DAYS),
                REMEMBER_DAYS_RANGE,
            ),
            cookie_name_length: parsed_env("COOKIE_NAME_LENGTH")
                .unwrap_or(DEFAULT_COOKIE_NAME_LENGTH),
            secure_cookies: parsed_env("SECURE_COOKIES").unwrap_or(true),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parsed_env("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Base64-encoded Vault key.
    pub fn vault_key(&self) -> &str {
        &self.vault_key
    }

    /// Site secret used to derive cookie names.
    pub fn cookie_secret(&self) -> &str {
        &self.cookie_secret
    }

    /// Absolute session lifetime.
    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes)
    }

    /// Window during which a session cookie is trusted without a database re-check.
    pub fn trust_window(&self) -> Duration {
        Duration::seconds(self.cookie_trust_seconds)
    }

    /// Lifetime of a persistent login.
    pub fn remember_lifetime(&self) -> Duration {
        Duration::days(self.remember_days)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn secret_from_env(name: &str, dev_default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            tracing::warn!("{} not set, using insecure default for development", name);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", name);
        }
    })
}

fn bounded(name: &str, value: i64, range: RangeInclusive<i64>) -> i64 {
    if !range.contains(&value) {
        panic!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        );
    }
    value
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
