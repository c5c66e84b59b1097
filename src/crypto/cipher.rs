//! AES-256-CTR keystream
//!
//! One `Keystream` per direction per connection. Applying it to a buffer
//! both encrypts and decrypts, given the same key, IV and position.

use super::{DerivedKey, IV_LEN};
use aes::Aes256;
use ctr::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Per-direction initialization vector, sent in clear ahead of the ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Fresh IV from the OS entropy source
    pub fn random() -> Self {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        Iv(iv)
    }

    /// Raw IV bytes
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

impl From<[u8; IV_LEN]> for Iv {
    fn from(bytes: [u8; IV_LEN]) -> Self {
        Iv(bytes)
    }
}

/// Running keystream for one direction of one connection
pub struct Keystream {
    inner: Aes256Ctr,
}

impl Keystream {
    /// Create a keystream positioned at offset zero
    pub fn new(key: &DerivedKey, iv: &Iv) -> Self {
        let inner = Aes256Ctr::new(
            GenericArray::from_slice(key.as_bytes()),
            GenericArray::from_slice(iv.as_bytes()),
        );
        Keystream { inner }
    }

    /// XOR `buf` with the next `buf.len()` keystream bytes and advance
    pub fn apply(&mut self, buf: &mut [u8]) {
        self.inner.apply_keystream(buf);
    }
}

impl std::fmt::Debug for Keystream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystream").finish_non_exhaustive()
    }
}
