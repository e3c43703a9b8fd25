//! IP address validation and allow/deny classification.

mod gate;

pub use gate::{DEFAULT_EXCLUSIONS, DEFAULT_INCLUDED_COUNTRIES, GateVerdict, IpGate, REDIRECT_ADDRESS};

use std::net::{IpAddr, Ipv4Addr};

use crate::error::{NetworkError, Result};

/// Prefixes treated as private or reserved and never geolocated.
const PRIVATE_PREFIXES: &[&str] = &[
    "::1", "0.", "10.", "14.", "24.", "39.", "127.", "128.", "169.", "172.", "191.", "192.",
    "224.",
];

fn is_private_prefix(address: &str) -> bool {
    PRIVATE_PREFIXES.iter().any(|p| address.starts_with(p))
}

fn parse_public(address: &str) -> Option<IpAddr> {
    let address = address.trim();
    if address.is_empty() || is_private_prefix(address) {
        return None;
    }
    address.parse().ok()
}

/// Whether `address` is a public IPv4 or IPv6 address.
pub fn is_valid_ip_address(address: &str) -> bool {
    parse_public(address).is_some()
}

/// Whether `address` is a public IPv4 address.
pub fn is_ipv4_address_valid(address: &str) -> bool {
    matches!(parse_public(address), Some(IpAddr::V4(_)))
}

/// Whether `address` is a public IPv6 address.
pub fn is_ipv6_address_valid(address: &str) -> bool {
    matches!(parse_public(address), Some(IpAddr::V6(_)))
}

/// IPv4 address as a network-order integer.
pub fn ip_to_u32(address: &str) -> Result<u32> {
    let parsed: Ipv4Addr = address
        .trim()
        .parse()
        .map_err(|_| NetworkError::InvalidAddress(address.to_string()))?;
    Ok(u32::from(parsed))
}

/// Inverse of [`ip_to_u32`].
pub fn u32_to_ip(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}
