//! # Fari - Password-Keyed Encrypted SOCKS5 Tunnel
//!
//! Fari carries SOCKS5 traffic over an AES-256-CTR encrypted TCP stream. Both
//! endpoints derive the same key from a shared password; each direction of a
//! connection opens with its own random IV.
//!
//! ## Features
//!
//! - **Server**: decrypts a SOCKS5 CONNECT (IPv4, IPv6, domain), dials the
//!   destination and relays both directions
//! - **Client**: accepts local applications and forwards their bytes,
//!   encrypted, to the server
//! - **Silent rejection**: protocol violations close the connection without
//!   an error reply
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fari::config::load_config;
//! use fari::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("fari.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config.server()?, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! App -> Fari client ==[encrypted]==> Fari server -> Destination
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod channel;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod relay;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use client::run_client;
pub use config::{load_config, Config};
pub use error::{FariError, Socks5Error};
pub use server::run_server;

/// Version of the Fari library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
