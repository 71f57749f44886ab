//! Shared setup for integration tests: an in-memory SQLite database with
//! migrations applied and a fresh vault key per test.

#![allow(dead_code)]

use std::sync::Arc;

use doorman::domain::Registration;
use doorman::services::{AuthService, ServiceContainer, Services, UserService};
use doorman::{Config, Database, Vault};

pub const COOKIE_SECRET: &str = "integration-cookie-secret-0123456789abcdef";
pub const PASSWORD: &str = "Password123";

/// One connection keeps every query on the same in-memory database.
pub fn test_config() -> Config {
    let mut config = Config::new("sqlite::memory:", Vault::generate_key(), COOKIE_SECRET);
    config.database_max_connections = 1;
    config.secure_cookies = false;
    config
}

pub async fn connect(config: &Config) -> Arc<Database> {
    Arc::new(
        Database::connect(config)
            .await
            .expect("in-memory database should connect"),
    )
}

pub fn vault(config: &Config) -> Vault {
    Vault::from_base64(config.vault_key()).expect("generated key is valid")
}

pub struct Harness {
    pub config: Config,
    pub database: Arc<Database>,
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub vault: Vault,
}

pub async fn harness_with(config: Config) -> Harness {
    let database = connect(&config).await;
    let vault = vault(&config);
    let services = Services::from_connection(database.get_connection(), &config, vault.clone());

    Harness {
        auth: services.auth(),
        users: services.users(),
        config,
        database,
        vault,
    }
}

pub async fn harness() -> Harness {
    harness_with(test_config()).await
}

pub fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
    }
}
