//! Vault - symmetric encryption of serialized state.
//!
//! Values are serialized to JSON and sealed with XChaCha20-Poly1305 under a
//! fresh random nonce. A `purpose` label is bound as associated data, so a
//! blob sealed for one use cannot be opened as another.
//!
//! Wire format: `base64url_nopad(nonce[24] || ciphertext || tag[16])`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Key length in bytes
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// Vault failures. Decryption errors deliberately carry no detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("vault key must be 32 bytes of base64")]
    InvalidKey,

    #[error("sealed value is malformed")]
    Malformed,

    #[error("sealed value failed authentication")]
    Decrypt,

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Symmetric cipher wrapper
#[derive(Clone)]
pub struct Vault {
    cipher: XChaCha20Poly1305,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault").field("key", &"[REDACTED]").finish()
    }
}

impl Vault {
    /// Build a vault from raw key bytes.
    pub fn new(key: &[u8]) -> Result<Self, VaultError> {
        if key.len() != KEY_LEN {
            return Err(VaultError::InvalidKey);
        }
        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key)),
        })
    }

    /// Build a vault from a standard base64 key (as produced by [`Vault::generate_key`]).
    pub fn from_base64(key: &str) -> Result<Self, VaultError> {
        let bytes = STANDARD
            .decode(key.trim())
            .map_err(|_| VaultError::InvalidKey)?;
        Self::new(&bytes)
    }

    /// Generate a random key, base64 encoded.
    pub fn generate_key() -> String {
        STANDARD.encode(XChaCha20Poly1305::generate_key(&mut OsRng))
    }

    /// Serialize and encrypt a value.
    pub fn seal<T: Serialize>(&self, purpose: &str, value: &T) -> Result<String, VaultError> {
        let plaintext =
            serde_json::to_vec(value).map_err(|e| VaultError::Serialization(e.to_string()))?;
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &plaintext,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| VaultError::Decrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decrypt and deserialize a value sealed for the same purpose.
    pub fn open<T: DeserializeOwned>(&self, purpose: &str, sealed: &str) -> Result<T, VaultError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| VaultError::Malformed)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::Malformed);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| VaultError::Decrypt)?;

        serde_json::from_slice(&plaintext).map_err(|e| VaultError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct UserInfo {
        id: u32,
        name: String,
    }

    fn vault() -> Vault {
        Vault::from_base64(&Vault::generate_key()).unwrap()
    }

    fn info() -> UserInfo {
        UserInfo {
            id: 7,
            name: "jdoe".to_string(),
        }
    }

    #[test]
    fn test_seal_then_open() {
        let vault = vault();
        let sealed = vault.seal("session", &info()).unwrap();

        assert!(!sealed.contains("jdoe"));
        assert_eq!(vault.open::<UserInfo>("session", &sealed).unwrap(), info());
    }

    #[test]
    fn test_nonce_makes_output_unique() {
        let vault = vault();
        let a = vault.seal("session", &info()).unwrap();
        let b = vault.seal("session", &info()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = vault().seal("session", &info()).unwrap();
        assert_eq!(
            vault().open::<UserInfo>("session", &sealed),
            Err(VaultError::Decrypt)
        );
    }

    #[test]
    fn test_wrong_purpose_fails() {
        let vault = vault();
        let sealed = vault.seal("session", &info()).unwrap();
        assert_eq!(
            vault.open::<UserInfo>("csrf", &sealed),
            Err(VaultError::Decrypt)
        );
    }

    #[test]
    fn test_tampering_fails() {
        let vault = vault();
        let sealed = vault.seal("session", &info()).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert_eq!(
            vault.open::<UserInfo>("session", &tampered),
            Err(VaultError::Decrypt)
        );
    }

    #[test]
    fn test_malformed_input() {
        let vault = vault();
        assert_eq!(vault.open::<UserInfo>("session", "%%%"), Err(VaultError::Malformed));
        assert_eq!(vault.open::<UserInfo>("session", "AAAA"), Err(VaultError::Malformed));
    }

    #[test]
    fn test_type_mismatch_is_serialization_error() {
        let vault = vault();
        let sealed = vault.seal("session", &"just a string").unwrap();
        assert!(matches!(
            vault.open::<UserInfo>("session", &sealed),
            Err(VaultError::Serialization(_))
        ));
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(Vault::new(&[0u8; 16]).unwrap_err(), VaultError::InvalidKey);
        assert_eq!(Vault::from_base64("not base64!").unwrap_err(), VaultError::InvalidKey);
        assert!(Vault::new(&[0u8; KEY_LEN]).is_ok());
    }
}
