//! Encrypted framing over a raw byte stream
//!
//! A [`FramedChannel`] wraps one connection and the shared [`DerivedKey`].
//! Each direction negotiates its IV lazily on first use, so callers above it
//! (the SOCKS5 handshake, the relay) only ever see plaintext.

mod codec;
mod state;
mod transfer;

pub use codec::{Decoder, Encoder};
pub use state::CipherState;
pub use transfer::{decode_transfer, encode_transfer, TRANSFER_BUFFER_SIZE};

use crate::crypto::DerivedKey;
use crate::error::Result;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};

/// Bidirectional encrypted channel over `S`
#[derive(Debug)]
pub struct FramedChannel<S> {
    stream: S,
    encoder: Encoder,
    decoder: Decoder,
}

impl<S> FramedChannel<S> {
    /// Wrap `stream`; no bytes are exchanged until the first encode/decode
    pub fn new(stream: S, key: Arc<DerivedKey>) -> Self {
        FramedChannel {
            stream,
            encoder: Encoder::new(key.clone()),
            decoder: Decoder::new(key),
        }
    }

    /// Whether this side has sent its IV
    pub fn encode_active(&self) -> bool {
        self.encoder.is_active()
    }

    /// Whether the peer's IV has been received
    pub fn decode_active(&self) -> bool {
        self.decoder.is_active()
    }
}

impl<S> FramedChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Encrypt and send `plaintext`, see [`Encoder::encode`]
    pub async fn encode(&mut self, plaintext: &[u8]) -> Result<usize> {
        self.encoder.encode(&mut self.stream, plaintext).await
    }

    /// Receive and decrypt into `buf`, see [`Decoder::decode`]
    pub async fn decode(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.decoder.decode(&mut self.stream, buf).await
    }

    /// Split into independently owned halves, keeping both cipher states
    pub fn into_split(self) -> (DecodeHalf<ReadHalf<S>>, EncodeHalf<WriteHalf<S>>) {
        let (reader, writer) = tokio::io::split(self.stream);
        (
            DecodeHalf {
                reader,
                decoder: self.decoder,
            },
            EncodeHalf {
                writer,
                encoder: self.encoder,
            },
        )
    }
}

/// Receiving half of a split [`FramedChannel`]
#[derive(Debug)]
pub struct DecodeHalf<R> {
    reader: R,
    decoder: Decoder,
}

impl<R: AsyncRead + Unpin> DecodeHalf<R> {
    /// Receive and decrypt into `buf`
    pub async fn decode(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.decoder.decode(&mut self.reader, buf).await
    }
}

/// Sending half of a split [`FramedChannel`]
#[derive(Debug)]
pub struct EncodeHalf<W> {
    writer: W,
    encoder: Encoder,
}

impl<W: AsyncWrite + Unpin> EncodeHalf<W> {
    /// Encrypt and send `plaintext`
    pub async fn encode(&mut self, plaintext: &[u8]) -> Result<usize> {
        self.encoder.encode(&mut self.writer, plaintext).await
    }
}
