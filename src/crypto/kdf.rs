//! Password key derivation
//!
//! Turns the shared password into the fixed-length key used by every
//! connection's keystream.

use super::KEY_LEN;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;

/// Symmetric key derived from the tunnel password
///
/// Computed once at startup and shared read-only across all sessions.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Derive a key from a password
    ///
    /// SHA-256 of the password bytes. Never fails: an empty password still
    /// yields a full-length key, but a warning is logged since every peer
    /// that knows the scheme can reproduce it.
    ///
    /// # Example
    ///
    /// ```
    /// use fari::crypto::{DerivedKey, KEY_LEN};
    ///
    /// let key = DerivedKey::derive("my-password");
    /// assert_eq!(key.as_bytes().len(), KEY_LEN);
    /// ```
    pub fn derive(password: &str) -> Self {
        if password.is_empty() {
            tracing::warn!("Empty password configured, derived key is weak");
        }

        let d = Sha256::new().chain_update(password.as_bytes()).finalize();
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&d);
        DerivedKey(key)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}
