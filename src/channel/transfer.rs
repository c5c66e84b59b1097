//! Transfer loops used by the relay
//!
//! `encode_transfer` pumps plaintext into a channel; `decode_transfer` pumps
//! decrypted channel data out to a plaintext stream. Both return the number
//! of plaintext bytes moved once the source reaches end of stream, and touch
//! the session [`Activity`] after every read that moved data.

use super::{DecodeHalf, EncodeHalf};
use crate::error::{FariError, Result};
use crate::relay::Activity;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Chunk size for one read in a transfer loop
pub const TRANSFER_BUFFER_SIZE: usize = 8192;

/// Read plaintext from `src` and encode it into `dst` until `src` ends
pub async fn encode_transfer<W, R>(
    dst: &mut EncodeHalf<W>,
    src: &mut R,
    activity: &Activity,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; TRANSFER_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = src.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        activity.touch();
        dst.encode(&buf[..n]).await?;
        total += n as u64;
    }
}

/// Decode data from `src` and write the plaintext to `dst` until `src` ends
pub async fn decode_transfer<W, R>(
    dst: &mut W,
    src: &mut DecodeHalf<R>,
    activity: &Activity,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; TRANSFER_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match src.decode(&mut buf).await {
            Ok(n) => n,
            Err(FariError::Closed) => return Ok(total),
            Err(e) => return Err(e),
        };
        activity.touch();
        dst.write_all(&buf[..n]).await?;
        dst.flush().await?;
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::FramedChannel;
    use crate::crypto::DerivedKey;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::duplex;

    fn key() -> Arc<DerivedKey> {
        Arc::new(DerivedKey::derive("transfer-test"))
    }

    #[tokio::test]
    async fn test_encode_then_decode_transfer() {
        let payload: Vec<u8> = (0..3 * TRANSFER_BUFFER_SIZE + 17)
            .map(|i| (i * 31 % 256) as u8)
            .collect();

        let (a, b) = duplex(1 << 20);
        let (_a_rx, mut a_tx) = FramedChannel::new(a, key()).into_split();
        let (mut b_rx, _b_tx) = FramedChannel::new(b, key()).into_split();

        let mut src = Cursor::new(payload.clone());
        let sent = encode_transfer(&mut a_tx, &mut src, &Activity::new()).await.unwrap();
        assert_eq!(sent, payload.len() as u64);
        drop(a_tx);
        drop(_a_rx);

        let mut out = Vec::new();
        let received = decode_transfer(&mut out, &mut b_rx, &Activity::new()).await.unwrap();
        assert_eq!(received, payload.len() as u64);
        assert_eq!(out, payload);
    }

    #[tokio::test]
    async fn test_encode_transfer_empty_source_writes_nothing() {
        let (a, mut raw) = duplex(1024);
        let (_rx, mut tx) = FramedChannel::new(a, key()).into_split();

        let mut src = Cursor::new(Vec::new());
        let sent = encode_transfer(&mut tx, &mut src, &Activity::new()).await.unwrap();
        assert_eq!(sent, 0);
        drop(tx);
        drop(_rx);

        let mut rest = Vec::new();
        raw.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_decode_transfer_underrun_is_error() {
        let (a, mut raw) = duplex(1024);
        let (mut rx, _tx) = FramedChannel::new(a, key()).into_split();

        raw.write_all(&[1, 2, 3]).await.unwrap();
        drop(raw);

        let mut out = Vec::new();
        let err = decode_transfer(&mut out, &mut rx, &Activity::new()).await.unwrap_err();
        assert!(matches!(err, FariError::HandshakeUnderrun { .. }));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_touches_activity() {
        let (a, b) = duplex(4096);
        let (_a_rx, mut a_tx) = FramedChannel::new(a, key()).into_split();
        let (mut b_rx, _b_tx) = FramedChannel::new(b, key()).into_split();

        let activity = Activity::new();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(activity.quiet_for() >= Duration::from_millis(50));

        let mut src = Cursor::new(b"tick".to_vec());
        encode_transfer(&mut a_tx, &mut src, &activity).await.unwrap();
        assert!(activity.quiet_for() < Duration::from_millis(50));

        let decoding = Activity::new();
        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(a_tx);
        drop(_a_rx);

        let mut out = Vec::new();
        decode_transfer(&mut out, &mut b_rx, &decoding).await.unwrap();
        assert_eq!(out, b"tick");
        assert!(decoding.quiet_for() < Duration::from_millis(50));
    }
}
