//! Service container - wires the concrete services over one database pool.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{AuthService, Authenticator, SessionSettings, UserManager, UserService};
use crate::config::Config;
use crate::infra::Persistence;
use crate::vault::Vault;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Build every service on top of a shared connection pool
    pub fn from_connection(db: DatabaseConnection, config: &Config, vault: Vault) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(
            uow.clone(),
            vault,
            SessionSettings::from(config),
        ));
        let user_service = Arc::new(UserManager::new(uow));

        Self::new(auth_service, user_service)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
