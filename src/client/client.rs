//! Client acceptor
//!
//! Accepts local applications and tunnels each one to the server.

use super::session::{handle_local, ClientContext};
use crate::config::ClientConfig;
use crate::crypto::DerivedKey;
use crate::transport::SocketOpts;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Local tunnel entry point
pub struct Client {
    listener: TcpListener,
    ctx: Arc<ClientContext>,
}

impl Client {
    /// Derive the key and bind the local listener
    pub async fn bind(config: &ClientConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

        let ctx = Arc::new(ClientContext {
            remote_addr: config.remote_addr.clone(),
            key: Arc::new(DerivedKey::derive(&config.password)),
            timeouts: config.timeouts.clone(),
            opts: SocketOpts::from_tcp_config(&config.tcp),
        });

        Ok(Client { listener, ctx })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept local connections until shutdown
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);
        info!("Remote server: {}", self.ctx.remote_addr);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Accept error: {}", e);
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    debug!("Accepted local connection from {}", peer);
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_local(stream, peer, ctx).await {
                            if e.is_closed() {
                                debug!("Session {} closed: {}", peer, e);
                            } else {
                                warn!("Session {} failed: {}", peer, e);
                            }
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping client");
                    break;
                }
            }
        }

        info!("Client stopped");
        Ok(())
    }
}

/// Bind and run a client until shutdown
pub async fn run_client(config: &ClientConfig, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let client = match Client::bind(config).await {
        Ok(client) => client,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };
    client.run(shutdown_rx).await
}
