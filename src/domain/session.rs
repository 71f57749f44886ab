//! Session state carried (sealed) in the session cookie, and the cookie trust rule.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserRole};

/// Outcome of the cookie trust check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Verified recently enough; accept without touching the database
    Trusted,
    /// Confirm the account against the database before accepting
    Recheck,
}

/// Identity snapshot stored in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    /// Login was made with "remember me"
    pub persistent: bool,
    pub issued_at: DateTime<Utc>,
    /// Last time the database confirmed this account
    pub verified_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(user: &User, persistent: bool, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            persistent,
            issued_at: now,
            verified_at: now,
        }
    }

    /// Sessions have an absolute lifetime counted from issue
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at >= ttl
    }

    /// Decide whether the session may skip the database re-check.
    pub fn trust(&self, now: DateTime<Utc>, window: Duration) -> Trust {
        let age = now - self.verified_at;
        // A verification stamp from the future is never trusted.
        if age < Duration::zero() || age >= window {
            Trust::Recheck
        } else {
            Trust::Trusted
        }
    }

    /// Refresh the snapshot after a successful database re-check
    pub fn reverify(&mut self, user: &User, now: DateTime<Utc>) {
        self.username = user.username.clone();
        self.role = user.role;
        self.verified_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::User,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_trusted_inside_window() {
        let now = Utc::now();
        let state = SessionState::new(&user(), false, now);

        assert_eq!(state.trust(now + Duration::seconds(10), Duration::seconds(60)), Trust::Trusted);
        assert_eq!(state.trust(now + Duration::seconds(60), Duration::seconds(60)), Trust::Recheck);
    }

    #[test]
    fn test_future_verification_is_rechecked() {
        let now = Utc::now();
        let state = SessionState::new(&user(), false, now + Duration::minutes(5));
        assert_eq!(state.trust(now, Duration::seconds(600)), Trust::Recheck);
    }

    #[test]
    fn test_zero_window_always_rechecks() {
        let now = Utc::now();
        let state = SessionState::new(&user(), false, now);
        assert_eq!(state.trust(now, Duration::zero()), Trust::Recheck);
    }

    #[test]
    fn test_expiry_is_absolute() {
        let now = Utc::now();
        let mut state = SessionState::new(&user(), true, now);
        let ttl = Duration::minutes(30);

        assert!(!state.is_expired(now + Duration::minutes(29), ttl));

        // Re-verification does not extend the lifetime
        let mut account = user();
        account.role = UserRole::Admin;
        state.reverify(&account, now + Duration::minutes(20));
        assert_eq!(state.role, UserRole::Admin);
        assert!(state.is_expired(now + Duration::minutes(30), ttl));
    }
}
