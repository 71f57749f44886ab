//! Infrastructure layer - External systems integration
//!
//! - Database connections, backend selection and migrations
//! - Repositories for users and remember-me tokens
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{NewUser, TokenRepository, TokenStore, UserRepository, UserStore};
pub use unit_of_work::{
    Persistence, TransactionContext, TxFuture, TxTokenRepository, TxUserRepository, UnitOfWork,
};

#[cfg(test)]
pub use repositories::{MockTokenRepository, MockUserRepository};
