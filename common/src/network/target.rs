//! # Scan Target Model
//!
//! Defines the possible inputs for a scan and their resolution into sweep
//! addresses. A target can be:
//! * The local LAN segment (keyword `lan`, detected from the interfaces).
//! * A single IPv4 host.
//! * An IPv4 range (e.g. `192.168.1.1-100`).
//! * A CIDR block (e.g. `192.168.1.0/24`).
//!
//! Malformed input surfaces as [`ConfigError::InvalidTarget`] at parse time,
//! before any probing begins.

use std::net::Ipv4Addr;
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;
use crate::network::interface;
use crate::network::range::{self, Ipv4Range};

/// Represents a distinct target to be scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Sweep the local network segment of the default interface.
    Lan,
    /// Sweep a single specific host.
    Host { target_addr: Ipv4Addr },
    /// Sweep a range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
}

impl FromStr for Target {
    type Err = ConfigError;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Keyword**: "lan" (case-insensitive).
    /// * **Host**: single IPv4 address (e.g. "192.168.1.5").
    /// * **Range**: "Start-End" (e.g. "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g. "192.168.1.0/24").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s).map_err(|reason| invalid(s, reason))? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s).map_err(|reason| invalid(s, reason))? {
            return Ok(target);
        }

        invalid_err(s, "expected an IPv4 address, range or CIDR block")
    }
}

impl Target {
    /// Expands the target into the concrete sweep addresses.
    ///
    /// `Lan` resolves against the default interface and strips the network
    /// and broadcast addresses when the segment is large enough.
    pub fn resolve_addrs(&self) -> anyhow::Result<Vec<Ipv4Addr>> {
        match self {
            Target::Lan => {
                let net = interface::lan_ipv4_network()?;
                let net_u32: u32 = u32::from(net.network());
                let broadcast_u32: u32 = u32::from(net.broadcast());

                let start_u32 = net_u32.saturating_add(1);
                let end_u32 = broadcast_u32.saturating_sub(1);

                let sweep_range = if start_u32 <= end_u32 {
                    Ipv4Range::new(Ipv4Addr::from(start_u32), Ipv4Addr::from(end_u32))
                } else {
                    warn!("network too small to strip broadcast, sweeping the full range");
                    Ipv4Range::new(net.network(), net.broadcast())
                };
                Ok(sweep_range.to_iter().collect())
            }
            Target::Host { target_addr } => Ok(vec![*target_addr]),
            Target::Range { ipv4_range } => Ok(ipv4_range.to_iter().collect()),
        }
    }
}

fn invalid(input: &str, reason: String) -> ConfigError {
    ConfigError::InvalidTarget {
        input: input.to_string(),
        reason,
    }
}

fn invalid_err(input: &str, reason: &str) -> Result<Target, ConfigError> {
    Err(invalid(input, reason.to_string()))
}

/// Parses a single IPv4 address.
fn parse_host(s: &str) -> Option<Target> {
    s.parse::<Ipv4Addr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Target>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr: Ipv4Addr = start_str
        .parse()
        .map_err(|e| format!("bad range start '{start_str}': {e}"))?;
    let end_addr = parse_range_end_addr(end_str, &start_addr)?;

    Ok(Some(Target::Range {
        ipv4_range: Ipv4Range::new(start_addr, end_addr),
    }))
}

/// End address of a range, with abbreviated forms completed from the start
/// address: "192.168.1.1-50" means 192.168.1.50.
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, String> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }
    if end_str.is_empty() {
        return Err(String::from("range end is missing"));
    }

    let trailing: Vec<&str> = end_str.split('.').collect();
    if trailing.len() > 4 {
        return Err(format!("range end '{end_str}' has too many octets"));
    }

    let mut octets = start_addr.octets();
    let keep = 4 - trailing.len();
    for (slot, octet_str) in octets[keep..].iter_mut().zip(trailing) {
        *slot = octet_str
            .parse()
            .map_err(|e| format!("bad range end '{end_str}': {e}"))?;
    }

    Ok(Ipv4Addr::from(octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<Target>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr: Ipv4Addr = ip_str
        .parse()
        .map_err(|e| format!("bad network address '{ip_str}': {e}"))?;
    let prefix: u8 = prefix_str
        .parse()
        .map_err(|e| format!("bad prefix length '{prefix_str}': {e}"))?;

    let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|e| e.to_string())?;
    Ok(Some(Target::Range { ipv4_range }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn range_end_completes_missing_octets_from_the_start() {
        let start = Ipv4Addr::new(192, 168, 1, 10);

        let cases = [
            ("192.168.1.50", Ipv4Addr::new(192, 168, 1, 50)),
            ("50", Ipv4Addr::new(192, 168, 1, 50)),
            ("2.66", Ipv4Addr::new(192, 168, 2, 66)),
            ("10.2.1", Ipv4Addr::new(192, 10, 2, 1)),
            ("10.20.30.40", Ipv4Addr::new(10, 20, 30, 40)),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_range_end_addr(input, &start), Ok(expected));
        }

        for bad in ["2.256", "1.2.3.4.5", ""] {
            assert!(parse_range_end_addr(bad, &start).is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn lan_keyword_is_case_insensitive() {
        assert!(matches!(Target::from_str("lan"), Ok(Target::Lan)));
        assert!(matches!(Target::from_str("LAN"), Ok(Target::Lan)));
    }

    #[test]
    fn hosts_ranges_and_cidr_blocks_all_parse() {
        assert!(matches!(
            Target::from_str("1.1.1.1"),
            Ok(Target::Host { .. })
        ));
        assert!(matches!(
            Target::from_str("10.0.0.1-10.0.0.255"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("192.168.1.1-255"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("192.168.1.1-2.255"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("10.0.0.0/24"),
            Ok(Target::Range { .. })
        ));
    }

    #[test]
    fn malformed_targets_are_config_errors() {
        for bad in ["not-an-ip", "10.0.0.1/33", "10.0.0.256-1.1.1.1", ""] {
            let parsed = Target::from_str(bad);
            assert!(
                matches!(parsed, Err(ConfigError::InvalidTarget { .. })),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn resolve_addrs_expands_range_in_order() {
        let target = Target::Range {
            ipv4_range: Ipv4Range::new(
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 3),
            ),
        };

        let addrs = target.resolve_addrs().unwrap();
        assert_eq!(
            addrs,
            vec![
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 0, 0, 3),
            ]
        );
    }

    #[test]
    fn resolve_addrs_for_single_host() {
        let target = Target::Host {
            target_addr: Ipv4Addr::new(10, 0, 0, 7),
        };
        assert_eq!(
            target.resolve_addrs().unwrap(),
            vec![Ipv4Addr::new(10, 0, 0, 7)]
        );
    }
}
