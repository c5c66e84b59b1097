//! Endpoint configuration types
//!
//! Defines the `[server]` and `[client]` sections of the configuration file.

use super::TcpConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default handshake deadline in seconds
fn default_handshake_timeout() -> u64 {
    10
}

/// Default destination dial deadline in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// Default relay idle timeout in seconds
fn default_idle_timeout() -> u64 {
    300
}

/// Per-phase deadlines, all in seconds
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Greeting plus request, must be non-zero
    #[serde(default = "default_handshake_timeout")]
    pub handshake: u64,

    /// Dialing the destination (server) or the remote server (client), must
    /// be non-zero
    #[serde(default = "default_connect_timeout")]
    pub connect: u64,

    /// Longest wait for a read during relay, 0 disables it
    #[serde(default = "default_idle_timeout")]
    pub idle: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            handshake: default_handshake_timeout(),
            connect: default_connect_timeout(),
            idle: default_idle_timeout(),
        }
    }
}

impl TimeoutConfig {
    /// Handshake deadline
    pub fn handshake(&self) -> Duration {
        Duration::from_secs(self.handshake)
    }

    /// Dial deadline
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }

    /// Relay idle deadline, `None` when disabled
    pub fn idle(&self) -> Option<Duration> {
        (self.idle > 0).then(|| Duration::from_secs(self.idle))
    }

    /// Only `idle` may be zero
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.handshake == 0 {
            return Err(format!("{}.timeouts.handshake must be greater than 0", section));
        }
        if self.connect == 0 {
            return Err(format!("{}.timeouts.connect must be greater than 0", section));
        }
        Ok(())
    }
}

/// Server endpoint: terminates the tunnel and speaks SOCKS5
#[derive(Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept tunnel clients on (e.g., "0.0.0.0:8388")
    pub listen_addr: String,

    /// Shared password
    pub password: String,

    /// Phase deadlines
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Socket options
    #[serde(default)]
    pub tcp: TcpConfig,
}

/// Client endpoint: accepts local connections and encrypts them to the server
#[derive(Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Local address to accept applications on (e.g., "127.0.0.1:1080")
    pub listen_addr: String,

    /// Server address (e.g., "server.example.com:8388")
    pub remote_addr: String,

    /// Shared password
    pub password: String,

    /// Phase deadlines
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Socket options
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_addr("server.listen_addr", &self.listen_addr)?;
        self.timeouts.validate("server")
    }
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_addr("client.listen_addr", &self.listen_addr)?;
        validate_addr("client.remote_addr", &self.remote_addr)?;
        self.timeouts.validate("client")
    }
}

// Debug output never includes the password
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("password", &"<redacted>")
            .field("timeouts", &self.timeouts)
            .field("tcp", &self.tcp)
            .finish()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("listen_addr", &self.listen_addr)
            .field("remote_addr", &self.remote_addr)
            .field("password", &"<redacted>")
            .field("timeouts", &self.timeouts)
            .field("tcp", &self.tcp)
            .finish()
    }
}

/// Check that `addr` looks like `host:port` with a numeric port
fn validate_addr(field: &str, addr: &str) -> Result<(), String> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| format!("{} must be host:port, got {:?}", field, addr))?;

    if host.is_empty() {
        return Err(format!("{} has an empty host", field));
    }

    port.parse::<u16>()
        .map_err(|_| format!("{} has an invalid port: {:?}", field, port))?;

    Ok(())
}
