//! One local connection on the client side

use crate::channel::FramedChannel;
use crate::config::TimeoutConfig;
use crate::crypto::DerivedKey;
use crate::error::Result;
use crate::relay::relay;
use crate::transport::{connect_addr, SocketOpts};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::debug;

/// Values shared by every session of one client
#[derive(Debug)]
pub struct ClientContext {
    /// Server to tunnel to
    pub remote_addr: String,
    /// Key derived once from the configured password
    pub key: Arc<DerivedKey>,
    /// Phase deadlines
    pub timeouts: TimeoutConfig,
    /// Options for accepted and dialed sockets
    pub opts: SocketOpts,
}

/// Tunnel one local application connection to the server
///
/// The application's bytes (its own SOCKS5 handshake included) are encrypted
/// verbatim; the client never interprets them.
pub async fn handle_local(local: TcpStream, peer: SocketAddr, ctx: Arc<ClientContext>) -> Result<()> {
    ctx.opts.apply(&local)?;

    let remote = connect_addr(&ctx.remote_addr, ctx.timeouts.connect(), &ctx.opts).await?;
    debug!("{} tunnelled via {}", peer, ctx.remote_addr);

    let channel = FramedChannel::new(remote, ctx.key.clone());
    relay(local, channel, ctx.timeouts.idle()).await
}
