//! Domain layer - Core business entities and rules
//!
//! Accounts, password hashing, registration rules with their numeric
//! violation codes, the session snapshot with its trust rule, and the
//! remember-me token. Nothing here touches the database or HTTP.

pub mod password;
pub mod registration;
pub mod remember;
pub mod session;
pub mod user;
pub mod violation;

pub use password::Password;
pub use registration::Registration;
pub use remember::{RememberToken, StoredToken};
pub use session::{SessionState, Trust};
pub use user::{User, UserResponse, UserRole};
pub use violation::{Violation, Violations};
