//! Test utilities and mocks for Fari
//!
//! This module provides common test utilities used across integration tests.

use fari::client::Client;
use fari::config::{ClientConfig, ServerConfig, TcpConfig, TimeoutConfig};
use fari::server::Server;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Spawn a TCP echo server on IPv4 loopback and return its address
pub async fn spawn_echo_server() -> SocketAddr {
    spawn_echo_server_on(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .await
        .unwrap()
}

/// Spawn a TCP echo server on `ip`, or `None` if `ip` cannot be bound
pub async fn spawn_echo_server_on(ip: IpAddr) -> Option<SocketAddr> {
    let listener = TcpListener::bind(SocketAddr::new(ip, 0)).await.ok()?;
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if stream.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });

    Some(addr)
}

/// Running endpoint; dropping it stops the accept loop
pub struct Running {
    /// Bound address
    pub addr: SocketAddr,
    _shutdown_tx: broadcast::Sender<bool>,
}

/// Bind a server on an ephemeral port and run it in the background
pub async fn spawn_server(config: ServerConfig) -> Running {
    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(server.run(shutdown_rx));
    Running {
        addr,
        _shutdown_tx: shutdown_tx,
    }
}

/// Bind a client on an ephemeral port and run it in the background
pub async fn spawn_client(config: ClientConfig) -> Running {
    let client = Client::bind(&config).await.unwrap();
    let addr = client.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(client.run(shutdown_rx));
    Running {
        addr,
        _shutdown_tx: shutdown_tx,
    }
}

/// Test configuration builder
pub struct TestConfigBuilder {
    password: String,
    remote_addr: String,
    timeouts: TimeoutConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            password: "test-password".to_string(),
            remote_addr: "127.0.0.1:8388".to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set shared password
    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Set the server address the client dials
    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = addr.to_string();
        self
    }

    /// Build a server section listening on an ephemeral port
    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            password: self.password.clone(),
            timeouts: self.timeouts.clone(),
            tcp: TcpConfig::default(),
        }
    }

    /// Build a client section listening on an ephemeral port
    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            remote_addr: self.remote_addr.clone(),
            password: self.password.clone(),
            timeouts: self.timeouts.clone(),
            tcp: TcpConfig::default(),
        }
    }
}

/// Plaintext SOCKS5 messages
pub mod socks5_mock {
    use fari::socks::*;
    use std::net::SocketAddr;

    /// Create a no-auth method selection request
    pub fn create_greeting() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a request for `cmd` towards `addr`
    pub fn create_request(cmd: u8, addr: SocketAddr) -> Vec<u8> {
        let mut msg = vec![SOCKS5_VERSION, cmd, SOCKS5_RESERVED];
        msg.extend_from_slice(&TargetAddr::from(addr).to_bytes().unwrap());
        msg
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            u8::try_from(domain.len()).unwrap(),
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
