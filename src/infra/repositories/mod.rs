//! Repository layer - Data access abstraction
//!
//! Consumers may supply their own storage by implementing the traits;
//! the shipped stores run on any SeaORM backend.

pub(crate) mod entities;
pub(crate) mod token_repository;
pub(crate) mod user_repository;

pub use token_repository::{TokenRepository, TokenStore};
pub use user_repository::{NewUser, UserRepository, UserStore};

#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
