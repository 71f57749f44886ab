//! CLI module - Command-line interface for the application.
//!
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `tokens` - Remember-me token maintenance
//! - `keygen` - Vault key generation

pub mod args;

pub use args::{Cli, Commands};
