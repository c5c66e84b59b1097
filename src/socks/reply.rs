//! SOCKS5 reply builder

use super::consts::*;

/// The CONNECT success reply
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The bound address is always `0.0.0.0:0` since BIND is not offered.
pub fn success_reply() -> [u8; 10] {
    [
        SOCKS5_VERSION,
        SOCKS5_REPLY_SUCCEEDED,
        SOCKS5_RESERVED,
        SOCKS5_ADDR_TYPE_IPV4,
        0,
        0,
        0,
        0,
        0,
        0,
    ]
}
