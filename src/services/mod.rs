//! Application services layer - Use cases and business logic.
//!
//! Services depend on the [`UnitOfWork`](crate::infra::UnitOfWork) abstraction
//! for repository access and transactions.

mod auth_service;
pub mod container;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{
    AuthService, Authenticator, CookieChange, LoginAttempt, PresentedCookies, ResumeSource,
    Resumption, Session, SessionSettings,
};
pub use user_service::{UserManager, UserService};
