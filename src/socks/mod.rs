//! SOCKS5 module for Fari
//!
//! The server side of the tunnel speaks a minimal RFC 1928 subset inside the
//! decrypted stream: no-auth greeting and CONNECT with IPv4, IPv6 or domain
//! destinations. Every violation drops the connection without a reply.

mod consts;
mod handshake;
mod reply;
mod request;
mod types;

pub use consts::*;
pub use handshake::{HandshakeState, Socks5Handshake};
pub use reply::success_reply;
pub use request::{parse_greeting, parse_request};
pub use types::{SocksCommand, TargetAddr};
