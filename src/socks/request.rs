//! SOCKS5 greeting and request parsing
//!
//! Both messages arrive whole in a single decoded read, so parsing works on
//! the received slice rather than on the stream.

use super::consts::*;
use super::types::{SocksCommand, TargetAddr};
use crate::error::Socks5Error;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Check a method-selection greeting
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// Only the version byte is checked; the offered methods are ignored and the
/// reply always selects "no authentication".
pub fn parse_greeting(msg: &[u8]) -> Result<(), Socks5Error> {
    match msg.first() {
        None => Err(Socks5Error::Truncated(0)),
        Some(&SOCKS5_VERSION) => Ok(()),
        Some(&v) => Err(Socks5Error::UnsupportedVersion(v)),
    }
}

/// Parse a CONNECT request
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Only the command is checked; the greeting already settled the version.
/// The port is taken from the last two bytes of the message. For domain
/// names everything between the length byte and the port is the name.
pub fn parse_request(msg: &[u8]) -> Result<TargetAddr, Socks5Error> {
    let n = msg.len();
    if n < 4 {
        return Err(Socks5Error::Truncated(n));
    }

    match SocksCommand::from_byte(msg[1]) {
        Some(SocksCommand::Connect) => {}
        _ => return Err(Socks5Error::CommandNotSupported(msg[1])),
    }

    let read_port = |min_len: usize| -> Result<u16, Socks5Error> {
        if n < min_len {
            return Err(Socks5Error::Truncated(n));
        }
        Ok(u16::from_be_bytes([msg[n - 2], msg[n - 1]]))
    };

    match msg[3] {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let port = read_port(4 + 4 + 2)?;
            let mut ip = [0u8; 4];
            ip.copy_from_slice(&msg[4..8]);
            Ok(TargetAddr::ipv4(Ipv4Addr::from(ip), port))
        }
        SOCKS5_ADDR_TYPE_DOMAIN => {
            let port = read_port(4 + 1 + 1 + 2)?;
            let domain = std::str::from_utf8(&msg[5..n - 2])
                .map_err(|_| Socks5Error::InvalidDomain)?;
            Ok(TargetAddr::domain(domain.to_string(), port))
        }
        SOCKS5_ADDR_TYPE_IPV6 => {
            let port = read_port(4 + 16 + 2)?;
            let mut ip = [0u8; 16];
            ip.copy_from_slice(&msg[4..20]);
            Ok(TargetAddr::ipv6(Ipv6Addr::from(ip), port))
        }
        other => Err(Socks5Error::AddressTypeNotSupported(other)),
    }
}
