//! IP address fields.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Decode a 16-byte address field.
///
/// The RFC 4291 IPv4-mapped form (`::ffff:a.b.c.d`: ten zero bytes, then
/// `ff ff`) yields an IPv4 address; every other pattern is IPv6.
pub fn decode_ip(bytes: [u8; 16]) -> IpAddr {
    match bytes {
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d] => {
            IpAddr::V4(Ipv4Addr::new(a, b, c, d))
        }
        _ => IpAddr::V6(Ipv6Addr::from(bytes)),
    }
}

/// Format a MAC address as colon-separated lowercase hex.
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
