//! Per-direction cipher state
//!
//! Each direction of a channel starts `Uninitialized` and moves to `Active`
//! exactly once, when its IV is generated (encode) or received (decode).

use crate::crypto::{DerivedKey, Iv, Keystream};
use crate::error::{FariError, Result};

/// Keystream lifecycle for one direction of one connection
#[derive(Debug, Default)]
pub enum CipherState {
    /// No IV exchanged yet
    #[default]
    Uninitialized,
    /// IV exchanged, keystream running
    Active(Keystream),
}

impl CipherState {
    /// Whether the IV for this direction has been exchanged
    pub fn is_active(&self) -> bool {
        matches!(self, CipherState::Active(_))
    }

    /// Start the keystream for `iv`
    ///
    /// Fails with [`FariError::KeystreamAlreadyActive`] if called twice; the
    /// running keystream is left untouched in that case.
    pub fn activate(&mut self, key: &DerivedKey, iv: &Iv) -> Result<()> {
        if self.is_active() {
            return Err(FariError::KeystreamAlreadyActive);
        }
        *self = CipherState::Active(Keystream::new(key, iv));
        Ok(())
    }

    /// Apply the running keystream to `buf`
    pub fn apply(&mut self, buf: &mut [u8]) -> Result<()> {
        match self {
            CipherState::Active(ks) => {
                ks.apply(buf);
                Ok(())
            }
            CipherState::Uninitialized => {
                Err(FariError::Protocol("keystream used before IV exchange".into()))
            }
        }
    }
}
