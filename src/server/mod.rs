//! Server endpoint
//!
//! Accepts tunnel clients, decrypts their SOCKS5 CONNECT and relays to the
//! requested destination.

#[allow(clippy::module_inception)]
mod server;
mod session;

pub use server::{run_server, Server};
pub use session::{handle_connection, SessionContext};
