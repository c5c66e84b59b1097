//! Server acceptor
//!
//! Owns the listening socket and spawns one session per tunnel client.

use super::session::{handle_connection, SessionContext};
use crate::config::ServerConfig;
use crate::crypto::DerivedKey;
use crate::error::FariError;
use crate::transport::SocketOpts;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Encrypted SOCKS5 server
pub struct Server {
    listener: TcpListener,
    ctx: Arc<SessionContext>,
}

impl Server {
    /// Derive the key and bind the listening socket
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

        let ctx = Arc::new(SessionContext {
            key: Arc::new(DerivedKey::derive(&config.password)),
            timeouts: config.timeouts.clone(),
            opts: SocketOpts::from_tcp_config(&config.tcp),
        });

        Ok(Server { listener, ctx })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept tunnel clients until shutdown
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            // EMFILE and friends are transient
                            warn!("Accept error: {}", e);
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    debug!("Accepted connection from {}", peer);
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        match handle_connection(stream, peer, ctx).await {
                            Ok(()) => {}
                            Err(FariError::Socks5(e)) => debug!("Session {} rejected: {}", peer, e),
                            Err(e) if e.is_closed() => debug!("Session {} closed: {}", peer, e),
                            Err(e) => warn!("Session {} failed: {}", peer, e),
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Bind and run a server until shutdown
pub async fn run_server(config: &ServerConfig, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };
    server.run(shutdown_rx).await
}
