//! Application state - Dependency injection container.

use std::sync::Arc;

use super::cookies::CookiePolicy;
use crate::config::Config;
use crate::infra::Database;
use crate::services::{AuthService, ServiceContainer, Services, UserService};
use crate::vault::Vault;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub database: Arc<Database>,
    pub cookies: Arc<CookiePolicy>,
}

impl AppState {
    /// Wire the concrete services over the database pool
    pub fn from_config(database: Arc<Database>, config: &Config, vault: Vault) -> Self {
        let container = Services::from_connection(database.get_connection(), config, vault);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            database,
            cookies: Arc::new(CookiePolicy::from_config(config)),
        }
    }

    /// Create state with manually injected services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
            cookies: Arc::new(cookies),
        }
    }
}
