//! Configuration module for Fari
//!
//! This module provides configuration types and parsing for both endpoints.

mod endpoint;
mod tcp;

pub use endpoint::{ClientConfig, ServerConfig, TimeoutConfig};
pub use tcp::TcpConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
///
/// A file may carry either section or both; the selected mode requires its
/// own section to be present.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server endpoint configuration
    #[serde(default)]
    pub server: Option<ServerConfig>,

    /// Client endpoint configuration
    #[serde(default)]
    pub client: Option<ClientConfig>,
}

impl Config {
    /// The `[server]` section, validated
    pub fn server(&self) -> Result<&ServerConfig> {
        let server = self
            .server
            .as_ref()
            .context("Missing [server] section in configuration")?;
        server.validate().map_err(anyhow::Error::msg)?;
        Ok(server)
    }

    /// The `[client]` section, validated
    pub fn client(&self) -> Result<&ClientConfig> {
        let client = self
            .client
            .as_ref()
            .context("Missing [client] section in configuration")?;
        client.validate().map_err(anyhow::Error::msg)?;
        Ok(client)
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse configuration")
}
