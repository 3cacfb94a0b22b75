//! Value checks shared by the configuration layer and the mapper.
//!
//! All helpers are lenient about surrounding whitespace and never panic on
//! user input.

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

static DELAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*(us|ms|s)?$").expect("Invalid delay regex")
});

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("Invalid MAC regex")
});

pub fn is_valid_ipv4(ip: &str) -> bool {
    ip.trim().parse::<Ipv4Addr>().is_ok()
}

/// Parse `a.b.c.d/len`. A bare address is read as a /32.
pub fn parse_ipv4_cidr(value: &str) -> Option<(Ipv4Addr, u8)> {
    let value = value.trim();
    let (addr, prefix) = match value.split_once('/') {
        Some((addr, prefix)) => (addr, prefix.parse::<u8>().ok()?),
        None => (value, 32),
    };
    let addr = addr.parse::<Ipv4Addr>().ok()?;
    (prefix <= 32).then_some((addr, prefix))
}

/// True for an address with an explicit prefix length, e.g. `10.0.0.0/8`.
pub fn is_valid_cidr(value: &str) -> bool {
    value.contains('/') && parse_ipv4_cidr(value).is_some()
}

pub fn is_valid_mac(mac: &str) -> bool {
    MAC.is_match(mac.trim())
}

/// Normalise a link delay for the emulator.
///
/// Unit-less numbers are taken as milliseconds (`"10"` becomes `"10ms"`).
/// Anything that is not a non-negative number with an optional `us`, `ms`
/// or `s` unit yields `None`.
pub fn normalize_delay(value: &str) -> Option<String> {
    let caps = DELAY.captures(value.trim())?;
    let amount = caps.get(1)?.as_str();
    let unit = caps.get(2).map_or("ms", |m| m.as_str());
    Some(format!("{}{}", amount, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr() {
        assert_eq!(parse_ipv4_cidr("10.0.0.0/8"), Some((Ipv4Addr::new(10, 0, 0, 0), 8)));
        assert_eq!(parse_ipv4_cidr("10.0.0.7"), Some((Ipv4Addr::new(10, 0, 0, 7), 32)));
        assert!(parse_ipv4_cidr("10.0.0.0/33").is_none());
        assert!(parse_ipv4_cidr("10.0.0/8").is_none());
        assert!(is_valid_cidr("192.168.0.0/16"));
        assert!(!is_valid_cidr("192.168.0.1"));
    }

    #[test]
    fn test_normalize_delay() {
        assert_eq!(normalize_delay("10"), Some("10ms".to_string()));
        assert_eq!(normalize_delay(" 2.5 ms "), Some("2.5ms".to_string()));
        assert_eq!(normalize_delay("1s"), Some("1s".to_string()));
        assert_eq!(normalize_delay("fast"), None);
        assert_eq!(normalize_delay("-5"), None);
        assert_eq!(normalize_delay(""), None);
    }

    #[test]
    fn test_mac_and_ip() {
        assert!(is_valid_mac("00:00:00:00:00:01"));
        assert!(!is_valid_mac("00:00:00:00:01"));
        assert!(is_valid_ipv4("10.0.0.1"));
        assert!(!is_valid_ipv4("10.0.0.256"));
    }
}
