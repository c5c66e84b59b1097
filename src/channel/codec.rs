//! Encode and decode halves of the framing
//!
//! Wire format per direction:
//!
//! ```text
//! +-----------+--------------------------------------+
//! |    IV     |  ciphertext (AES-256-CTR, same size) |
//! +-----------+--------------------------------------+
//! |    16     |               Variable               |
//! +-----------+--------------------------------------+
//! ```
//!
//! The IV is sent once, in front of the first ciphertext of the direction.

use super::state::CipherState;
use crate::crypto::{DerivedKey, Iv, IV_LEN};
use crate::error::{FariError, Result};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Sending side of one direction
#[derive(Debug)]
pub struct Encoder {
    key: Arc<DerivedKey>,
    state: CipherState,
    scratch: Vec<u8>,
}

impl Encoder {
    /// Create an encoder that has not sent its IV yet
    pub fn new(key: Arc<DerivedKey>) -> Self {
        Encoder {
            key,
            state: CipherState::Uninitialized,
            scratch: Vec::new(),
        }
    }

    /// Whether the IV preamble has already been emitted
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Encrypt `plaintext` and write it to `writer`
    ///
    /// The first call generates an IV and writes it in front of the
    /// ciphertext in the same write. The full frame must be written; a short
    /// write surfaces as an I/O error.
    ///
    /// Returns the number of plaintext bytes consumed.
    pub async fn encode<W>(&mut self, writer: &mut W, plaintext: &[u8]) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        self.scratch.clear();

        if !self.state.is_active() {
            let iv = Iv::random();
            self.state.activate(&self.key, &iv)?;
            self.scratch.extend_from_slice(iv.as_bytes());
            trace!("Encode direction activated");
        }

        let offset = self.scratch.len();
        self.scratch.extend_from_slice(plaintext);
        self.state.apply(&mut self.scratch[offset..])?;

        writer.write_all(&self.scratch).await?;
        writer.flush().await?;

        Ok(plaintext.len())
    }
}

/// Receiving side of one direction
#[derive(Debug)]
pub struct Decoder {
    key: Arc<DerivedKey>,
    state: CipherState,
}

impl Decoder {
    /// Create a decoder that has not received its IV yet
    pub fn new(key: Arc<DerivedKey>) -> Self {
        Decoder {
            key,
            state: CipherState::Uninitialized,
        }
    }

    /// Whether the peer's IV has been received
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Read from `reader` and decrypt into `buf`
    ///
    /// The first call consumes exactly the IV preamble before reading data.
    /// A preamble cut short by end of stream is a
    /// [`FariError::HandshakeUnderrun`]; end of stream with no bytes at all
    /// is [`FariError::Closed`], as is end of stream on any later read.
    pub async fn decode<R>(&mut self, reader: &mut R, buf: &mut [u8]) -> Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        if !self.state.is_active() {
            let iv = read_iv(reader).await?;
            self.state.activate(&self.key, &iv)?;
            trace!("Decode direction activated");
        }

        if buf.is_empty() {
            return Ok(0);
        }

        let n = reader.read(buf).await?;
        if n == 0 {
            return Err(FariError::Closed);
        }

        self.state.apply(&mut buf[..n])?;
        Ok(n)
    }
}

/// Read the IV preamble, tolerating it arriving in pieces
async fn read_iv<R>(reader: &mut R) -> Result<Iv>
where
    R: AsyncRead + Unpin,
{
    let mut iv = [0u8; IV_LEN];
    let mut got = 0;

    while got < IV_LEN {
        let n = reader.read(&mut iv[got..]).await?;
        if n == 0 {
            if got == 0 {
                return Err(FariError::Closed);
            }
            return Err(FariError::HandshakeUnderrun {
                expected: IV_LEN,
                got,
            });
        }
        got += n;
    }

    Ok(Iv::from(iv))
}
