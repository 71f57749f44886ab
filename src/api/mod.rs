//! API layer - HTTP handlers and middleware
//!
//! - Cookie naming and issuance
//! - Request handlers
//! - Session middleware
//! - Custom extractors
//! - Route definitions

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use cookies::{CookieNames, CookiePolicy};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
