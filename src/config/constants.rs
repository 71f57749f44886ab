//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

use std::ops::RangeInclusive;

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Highest page number whose row offset still fits a signed 64-bit SQL integer
pub const MAX_PAGE_NUMBER: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

// =============================================================================
// Sessions & Cookies
// =============================================================================

/// Default absolute session lifetime in minutes
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

/// Default cookie trust window in seconds.
/// Inside this window a session cookie is accepted without a database re-check.
pub const DEFAULT_COOKIE_TRUST_SECONDS: i64 = 300;

/// Default lifetime of a persistent login in days
pub const DEFAULT_REMEMBER_DAYS: i64 = 30;

/// Accepted ranges for the duration settings
pub const SESSION_TTL_MINUTES_RANGE: RangeInclusive<i64> = 1..=525_600;
pub const COOKIE_TRUST_SECONDS_RANGE: RangeInclusive<i64> = 0..=86_400;
pub const REMEMBER_DAYS_RANGE: RangeInclusive<i64> = 1..=3_650;

/// Default number of hex characters kept from the cookie name digest
pub const DEFAULT_COOKIE_NAME_LENGTH: usize = 16;

/// Bounds for the cookie name digest length
pub const MIN_COOKIE_NAME_LENGTH: usize = 8;
pub const MAX_COOKIE_NAME_LENGTH: usize = 128;

/// Minimum cookie secret length (security requirement)
pub const MIN_COOKIE_SECRET_LENGTH: usize = 32;

/// Label mixed into the session cookie name digest
pub const SESSION_COOKIE_LABEL: &str = "session";

/// Label mixed into the remember cookie name digest
pub const REMEMBER_COOKIE_LABEL: &str = "remember";

/// Vault purpose bound to sealed session state
pub const VAULT_PURPOSE_SESSION: &str = "doorman.session.v1";

/// Size of the raw remember-me token in bytes (hex-encoded on the wire)
pub const REMEMBER_TOKEN_BYTES: usize = 32;

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// =============================================================================
// Database
// =============================================================================

/// Default database connection URL (for development)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://doorman.db?mode=rwc";

/// Default connection pool size
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Username length bounds (in characters)
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Maximum email length accepted on registration
pub const MAX_EMAIL_LENGTH: usize = 254;
