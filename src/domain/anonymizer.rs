//! Client address anonymization.
//!
//! Likes are deduplicated per coarsened client address rather than per
//! exact address: the last IPv4 octet and everything past the fourth IPv6
//! group are dropped. Addresses that cannot be parsed all collapse onto
//! the `0.0.0.0` sentinel and therefore share a single like per symbol.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Sentinel identity for every unparseable client address.
pub const FALLBACK_IDENTITY: &str = "0.0.0.0";

/// Privacy-reduced client identity used as the ledger's liker key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnonymizedIp(String);

impl AnonymizedIp {
    /// The shared identity of all unparseable addresses.
    pub fn fallback() -> Self {
        Self(FALLBACK_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_IDENTITY
    }
}

impl std::fmt::Display for AnonymizedIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the anonymized identity for a raw client address.
///
/// - IPv4 `a.b.c.d` becomes `a.b.c.0`
/// - IPv6 keeps its first four groups followed by `::`
/// - IPv4-mapped IPv6 (`::ffff:a.b.c.d`) takes the IPv4 path
/// - a trailing port (`a.b.c.d:port`, `[ipv6]:port`) is ignored
/// - anything else becomes `0.0.0.0`
pub fn anonymize(raw: &str) -> AnonymizedIp {
    let raw = raw.trim();
    let ip = raw
        .parse::<IpAddr>()
        .or_else(|_| raw.parse::<SocketAddr>().map(|socket| socket.ip()));

    match ip {
        Ok(IpAddr::V4(v4)) => anonymize_v4(v4),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => anonymize_v4(v4),
            None => anonymize_v6(v6),
        },
        Err(_) => AnonymizedIp::fallback(),
    }
}

fn anonymize_v4(addr: Ipv4Addr) -> AnonymizedIp {
    let [a, b, c, _] = addr.octets();
    AnonymizedIp(format!("{a}.{b}.{c}.0"))
}

fn anonymize_v6(addr: Ipv6Addr) -> AnonymizedIp {
    let [g0, g1, g2, g3, ..] = addr.segments();
    AnonymizedIp(format!("{g0:x}:{g1:x}:{g2:x}:{g3:x}::"))
}
