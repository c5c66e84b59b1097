//! Cryptographic primitives for the tunnel
//!
//! Key derivation from the shared password and the per-direction
//! AES-256-CTR keystream. Confidentiality only: nothing here authenticates
//! the ciphertext.

mod cipher;
mod kdf;

pub use cipher::{Iv, Keystream};
pub use kdf::DerivedKey;

/// Length of the derived key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Length of the per-direction IV preamble in bytes
pub const IV_LEN: usize = 16;
