//! Outbound TCP dialer

use super::SocketOpts;
use crate::error::{FariError, Result};
use crate::socks::TargetAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Resolve `target` and connect to it within `timeout`
///
/// Socket options are applied before the stream is returned.
pub async fn connect(target: &TargetAddr, timeout: Duration, opts: &SocketOpts) -> Result<TcpStream> {
    let dial = async {
        let addr = target.resolve().await?;
        let stream = TcpStream::connect(addr).await?;
        Ok::<_, FariError>((addr, stream))
    };

    let (addr, stream) = tokio::time::timeout(timeout, dial)
        .await
        .map_err(|_| FariError::Timeout(format!("connect to {}", target)))??;

    opts.apply(&stream)?;

    tracing::debug!("TCP connection established to {} ({})", target, addr);

    Ok(stream)
}

/// Connect to a configured `host:port` address within `timeout`
pub async fn connect_addr(addr: &str, timeout: Duration, opts: &SocketOpts) -> Result<TcpStream> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| FariError::Timeout(format!("connect to {}", addr)))??;

    opts.apply(&stream)?;

    tracing::debug!("TCP connection established to {}", addr);

    Ok(stream)
}
