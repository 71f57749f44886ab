//! doorman - account registration, cookie sessions and remember-me login.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, registration rules, violation codes, session state, remember tokens
//! - **vault**: Authenticated encryption of client-held state
//! - **services**: Authentication and user administration use cases
//! - **infra**: Database access, repositories, migrations, unit of work
//! - **api**: Cookies, HTTP handlers, session middleware and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Generate a vault key
//! cargo run -- keygen
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod vault;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole, Violation, Violations};
pub use errors::{AppError, AppResult};
pub use infra::Database;
pub use vault::{Vault, VaultError};
