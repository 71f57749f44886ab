//! Persistent-login ("remember me") token.
//!
//! The raw token only ever travels in the cookie; storage keeps its SHA-1
//! fingerprint so a leaked table cannot be replayed as cookies.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::config::REMEMBER_TOKEN_BYTES;

/// Raw remember-me token as sent to the browser
#[derive(Clone, PartialEq, Eq)]
pub struct RememberToken(String);

impl std::fmt::Debug for RememberToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RememberToken").field(&"[REDACTED]").finish()
    }
}

impl RememberToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        let mut bytes = [0u8; REMEMBER_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accept a cookie value only if it has the exact shape of a generated token
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == REMEMBER_TOKEN_BYTES * 2
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

/// Persisted record of an issued token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Lowercase hex SHA-1 of a raw token
pub fn fingerprint(raw: &str) -> String {
    hex::encode(Sha1::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_parse() {
        let a = RememberToken::generate();
        let b = RememberToken::generate();

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(RememberToken::parse(a.as_str()), Some(a));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RememberToken::parse("").is_none());
        assert!(RememberToken::parse("abc").is_none());
        assert!(RememberToken::parse(&"G".repeat(64)).is_none());
        assert!(RememberToken::parse(&"A".repeat(64)).is_none());
    }

    #[test]
    fn test_fingerprint_is_sha1_hex() {
        // SHA-1("abc")
        assert_eq!(fingerprint("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        let token = RememberToken::generate();
        assert_eq!(token.fingerprint().len(), 40);
        assert_ne!(token.fingerprint(), token.as_str());
    }

    #[test]
    fn test_stored_token_expiry() {
        let now = Utc::now();
        let stored = StoredToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fingerprint: fingerprint("x"),
            created_at: now,
            expires_at: now + chrono::Duration::days(1),
        };

        assert!(!stored.is_expired(now));
        assert!(stored.is_expired(stored.expires_at));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = RememberToken::generate();
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
