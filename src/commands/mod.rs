//! Commands module - CLI command implementations.

pub mod keygen;
pub mod migrate;
pub mod serve;
pub mod tokens;
