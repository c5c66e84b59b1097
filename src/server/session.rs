//! One tunnel session on the server side

use crate::channel::FramedChannel;
use crate::config::TimeoutConfig;
use crate::crypto::DerivedKey;
use crate::error::{FariError, Result};
use crate::relay::relay;
use crate::socks::Socks5Handshake;
use crate::transport::SocketOpts;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Values shared by every session of one server
#[derive(Debug)]
pub struct SessionContext {
    /// Key derived once from the configured password
    pub key: Arc<DerivedKey>,
    /// Phase deadlines
    pub timeouts: TimeoutConfig,
    /// Options for accepted and dialed sockets
    pub opts: SocketOpts,
}

/// Serve one accepted tunnel client until either side closes
///
/// Decrypts the SOCKS5 handshake, dials the destination and relays. Any
/// failure closes the client connection without a reply.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<SessionContext>,
) -> Result<()> {
    ctx.opts.apply(&stream)?;

    let mut channel = FramedChannel::new(stream, ctx.key.clone());
    let mut handshake = Socks5Handshake::new();

    let negotiated =
        tokio::time::timeout(ctx.timeouts.handshake(), handshake.negotiate(&mut channel)).await;
    let target = match negotiated {
        Ok(result) => result?,
        Err(_) => {
            handshake.close();
            return Err(FariError::Timeout(format!("handshake with {}", peer)));
        }
    };

    debug!("{} requested CONNECT {}", peer, target);

    let dest = handshake
        .connect(&mut channel, &target, ctx.timeouts.connect(), &ctx.opts)
        .await?;

    info!("{} <-> {}", peer, target);

    relay(dest, channel, ctx.timeouts.idle()).await?;

    debug!("Session {} -> {} closed", peer, target);
    Ok(())
}
