//! Bidirectional relay between a plaintext stream and an encrypted channel
//!
//! Two tasks per session, one per direction. The first to finish fires the
//! session shutdown; the other stops at its next await and both sockets are
//! dropped. With an idle limit, a watchdog fires the same shutdown once
//! neither direction has moved data for that long.

mod activity;
mod shutdown;

pub use activity::Activity;
pub use shutdown::SessionShutdown;

use crate::channel::{decode_transfer, encode_transfer, FramedChannel};
use crate::error::{FariError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Relay until either direction ends or the session goes idle
///
/// - channel → plain: [`decode_transfer`]
/// - plain → channel: [`encode_transfer`]
///
/// On the server, `plain` is the destination and `channel` wraps the tunnel
/// client. On the client endpoint, `plain` is the local application and
/// `channel` wraps the connection to the server.
///
/// Returns the error of the direction that ended first, if it failed, or
/// [`FariError::Timeout`] if the idle watchdog ended the session.
pub async fn relay<P, S>(plain: P, channel: FramedChannel<S>, idle: Option<Duration>) -> Result<()>
where
    P: AsyncRead + AsyncWrite + Send + 'static,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let shutdown = Arc::new(SessionShutdown::new());
    let activity = Arc::new(Activity::new());

    let (mut plain_rx, mut plain_tx) = tokio::io::split(plain);
    let (mut channel_rx, mut channel_tx) = channel.into_split();

    let inbound = {
        let shutdown = shutdown.clone();
        let activity = activity.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                r = decode_transfer(&mut plain_tx, &mut channel_rx, &activity) => Some(r),
                _ = shutdown.wait() => None,
            };
            drop(plain_tx);
            drop(channel_rx);
            let first = shutdown.trigger();
            (result, first)
        })
    };

    let outbound = {
        let shutdown = shutdown.clone();
        let activity = activity.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                r = encode_transfer(&mut channel_tx, &mut plain_rx, &activity) => Some(r),
                _ = shutdown.wait() => None,
            };
            drop(channel_tx);
            drop(plain_rx);
            let first = shutdown.trigger();
            (result, first)
        })
    };

    let watchdog = idle.map(|limit| {
        let shutdown = shutdown.clone();
        let activity = activity.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = activity.expired(limit) => shutdown.trigger(),
                _ = shutdown.wait() => false,
            }
        })
    });

    let (inbound, outbound) = tokio::join!(inbound, outbound);
    let (inbound_result, inbound_first) = inbound?;
    let (outbound_result, outbound_first) = outbound?;

    let idle_fired = match watchdog {
        Some(handle) => handle.await?,
        None => false,
    };

    log_direction("decode", &inbound_result);
    log_direction("encode", &outbound_result);

    if idle_fired {
        let limit = idle.unwrap_or_default();
        debug!("Session idle for {:?}", limit);
        return Err(FariError::Timeout(format!("no traffic for {:?}", limit)));
    }

    let first = if inbound_first {
        inbound_result
    } else if outbound_first {
        outbound_result
    } else {
        None
    };

    match first {
        Some(Err(e)) => Err(e),
        _ => Ok(()),
    }
}

fn log_direction(name: &str, result: &Option<Result<u64>>) {
    match result {
        Some(Ok(bytes)) => debug!("{} direction finished: {} bytes", name, bytes),
        Some(Err(e)) => debug!("{} direction error: {}", name, e),
        None => debug!("{} direction cancelled by session shutdown", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DerivedKey;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn key() -> Arc<DerivedKey> {
        Arc::new(DerivedKey::derive("relay-test"))
    }

    #[tokio::test]
    async fn test_relay_both_directions() {
        let (plain_outer, plain_inner) = duplex(65536);
        let (tunnel_outer, tunnel_inner) = duplex(65536);

        let handle = tokio::spawn(relay(
            plain_inner,
            FramedChannel::new(tunnel_inner, key()),
            None,
        ));

        let mut peer = FramedChannel::new(tunnel_outer, key());
        let mut plain = plain_outer;

        // Peer -> plain
        peer.encode(b"message from peer").await.unwrap();
        let mut buf = vec![0u8; 17];
        plain.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"message from peer");

        // Plain -> peer
        plain.write_all(b"reply from plain").await.unwrap();
        let mut got = Vec::new();
        let mut chunk = [0u8; 64];
        while got.len() < 16 {
            let n = peer.decode(&mut chunk).await.unwrap();
            got.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(&got, b"reply from plain");

        drop(peer);
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_relay_plain_eof_closes_tunnel() {
        let (plain_outer, plain_inner) = duplex(1024);
        let (tunnel_outer, tunnel_inner) = duplex(1024);

        let handle = tokio::spawn(relay(
            plain_inner,
            FramedChannel::new(tunnel_inner, key()),
            None,
        ));

        drop(plain_outer);

        // The tunnel side sees end of stream once the session is torn down
        let mut peer = tunnel_outer;
        let mut rest = Vec::new();
        tokio::time::timeout(Duration::from_secs(1), peer.read_to_end(&mut rest))
            .await
            .unwrap()
            .unwrap();
        assert!(rest.is_empty());

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_relay_tunnel_garbage_underrun_closes_plain() {
        let (plain_outer, plain_inner) = duplex(1024);
        let (mut tunnel_outer, tunnel_inner) = duplex(1024);

        let handle = tokio::spawn(relay(
            plain_inner,
            FramedChannel::new(tunnel_inner, key()),
            None,
        ));

        tunnel_outer.write_all(&[1, 2, 3]).await.unwrap();
        drop(tunnel_outer);

        let mut plain = plain_outer;
        let mut rest = Vec::new();
        tokio::time::timeout(Duration::from_secs(1), plain.read_to_end(&mut rest))
            .await
            .unwrap()
            .unwrap();
        assert!(rest.is_empty());

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_relay_idle_timeout_ends_session() {
        let (_plain_outer, plain_inner) = duplex(1024);
        let (_tunnel_outer, tunnel_inner) = duplex(1024);

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            relay(
                plain_inner,
                FramedChannel::new(tunnel_inner, key()),
                Some(Duration::from_millis(20)),
            ),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(FariError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_relay_one_way_stream_outlives_idle_limit() {
        let (plain_outer, plain_inner) = duplex(4096);
        let (tunnel_outer, tunnel_inner) = duplex(4096);
        let idle = Duration::from_millis(200);

        let handle = tokio::spawn(relay(
            plain_inner,
            FramedChannel::new(tunnel_inner, key()),
            Some(idle),
        ));

        // Destination pushes for five times the idle limit; the peer never writes
        let mut plain = plain_outer;
        let writer = tokio::spawn(async move {
            for _ in 0..20 {
                plain.write_all(b"data").await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            plain
        });

        let mut peer = FramedChannel::new(tunnel_outer, key());
        let mut got = Vec::new();
        let mut chunk = [0u8; 64];
        while got.len() < 80 {
            let n = peer.decode(&mut chunk).await.unwrap();
            got.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(got, b"data".repeat(20));

        let plain = writer.await.unwrap();
        assert!(!handle.is_finished());

        // Once both sides are silent the watchdog ends the session
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(FariError::Timeout(_))));
        drop(plain);
    }
}
