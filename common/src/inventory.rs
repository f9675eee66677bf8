//! # Inventory Data Model
//!
//! One [`DeviceRecord`] is produced per discovered host and handed, in
//! discovery order, to whatever consumes the scan (report renderer, exporter).
//! Optional fields mean "not retrieved", never "measured as zero".

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

/// A host that answered the address-resolution sweep.
///
/// Immutable once produced; the address is unique within a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCandidate {
    pub addr: Ipv4Addr,
    pub mac: MacAddr,
}

/// Outcome of the echo/connect liveness check.
#[derive(Debug, Clone, PartialEq)]
pub struct Reachability {
    pub is_alive: bool,
    /// Only measured by the echo probe; the connect fallback leaves it unset.
    pub avg_rtt_ms: Option<f64>,
    pub packet_loss_percent: f64,
}

impl Reachability {
    pub fn unreachable() -> Self {
        Self {
            is_alive: false,
            avg_rtt_ms: None,
            packet_loss_percent: 100.0,
        }
    }
}

/// Coarse device category derived from the OS/description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceType {
    Server,
    Workstation,
    Mobile,
    NetworkDevice,
    #[default]
    Unknown,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &str = match self {
            DeviceType::Server => "Server",
            DeviceType::Workstation => "Workstation",
            DeviceType::Mobile => "Mobile",
            DeviceType::NetworkDevice => "Network Device",
            DeviceType::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub os_name: String,
    pub device_type: DeviceType,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            os_name: String::from("Unknown"),
            device_type: DeviceType::Unknown,
        }
    }
}

/// Operational state of one interface as reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Up,
    Down,
}

/// Counters for one interface index on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStats {
    pub index: u32,
    pub description: String,
    pub oper_status: PortStatus,
    pub in_octets: Option<u64>,
    pub out_octets: Option<u64>,
    pub in_errors: Option<u64>,
    pub out_errors: Option<u64>,
    pub in_discards: Option<u64>,
    pub out_discards: Option<u64>,
}

impl InterfaceStats {
    pub fn new(index: u32, description: String) -> Self {
        Self {
            index,
            description,
            oper_status: PortStatus::Down,
            in_octets: None,
            out_octets: None,
            in_errors: None,
            out_errors: None,
            in_discards: None,
            out_discards: None,
        }
    }
}

/// Host resource load as reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceStats {
    /// Unweighted mean over all processor entries.
    pub cpu_load_percent: Option<f64>,
    pub memory_used_percent: Option<f64>,
}

/// System-group details of a managed device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemInfo {
    pub description: Option<String>,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub uptime_ticks: Option<u64>,
}

/// Everything one management session yielded for a device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceTelemetry {
    pub system: SystemInfo,
    pub resources: ResourceStats,
    pub interfaces: BTreeMap<u32, InterfaceStats>,
}

/// The merged inventory record for one host.
///
/// Created exactly once per candidate by the aggregator and immutable
/// thereafter. The record always exists even when every enrichment failed;
/// maps may be empty and optional fields absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub addr: Ipv4Addr,
    pub mac: MacAddr,
    pub vendor: String,
    pub hostname: Option<String>,
    pub reachability: Reachability,
    pub classification: Classification,
    pub resources: Option<ResourceStats>,
    pub interfaces: BTreeMap<u32, InterfaceStats>,
    pub firmware_compliant: Option<bool>,
}

impl DeviceRecord {
    /// Defaults-only record for a host whose enrichment never completed.
    pub fn offline(candidate: &HostCandidate) -> Self {
        Self {
            addr: candidate.addr,
            mac: candidate.mac,
            vendor: String::from("Unknown"),
            hostname: None,
            reachability: Reachability::unreachable(),
            classification: Classification::default(),
            resources: None,
            interfaces: BTreeMap::new(),
            firmware_compliant: None,
        }
    }
}
