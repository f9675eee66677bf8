//! Probe doubles shared by the integration tests.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::datalink::MacAddr;

use netinv_common::config::ScanConfig;
use netinv_common::inventory::{DeviceTelemetry, HostCandidate, Reachability};
use netinv_common::network::target::Target;
use netinv_common::probes::{OsFingerprinter, ReachabilityProbe, TelemetrySource, VendorRepository};

pub fn config() -> ScanConfig {
    ScanConfig::new(Target::Host {
        target_addr: Ipv4Addr::new(127, 0, 0, 1),
    })
}

pub fn candidates(count: u8) -> Vec<HostCandidate> {
    (0..count)
        .map(|i| HostCandidate {
            addr: Ipv4Addr::new(10, 0, 0, i + 1),
            mac: MacAddr(0x00, 0x11, 0x22, 0x33, 0x44, i),
        })
        .collect()
}

/// Answers faster for later candidates, so completion order is the reverse
/// of discovery order.
pub struct InvertedDelayProbe {
    pub total: u8,
}

#[async_trait]
impl ReachabilityProbe for InvertedDelayProbe {
    async fn probe(&self, addr: Ipv4Addr) -> Reachability {
        let position = u64::from(addr.octets()[3]);
        let delay = (u64::from(self.total)).saturating_sub(position) * 20;
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Reachability {
            is_alive: true,
            avg_rtt_ms: Some(position as f64),
            packet_loss_percent: 0.0,
        }
    }
}

pub struct NoFingerprint;

#[async_trait]
impl OsFingerprinter for NoFingerprint {
    async fn fingerprint(&self, _addr: Ipv4Addr) -> Option<String> {
        None
    }
}

pub struct FixedFingerprint(pub &'static str);

#[async_trait]
impl OsFingerprinter for FixedFingerprint {
    async fn fingerprint(&self, _addr: Ipv4Addr) -> Option<String> {
        Some(String::from(self.0))
    }
}

pub struct StaticVendor;

impl VendorRepository for StaticVendor {
    fn vendor_for(&self, _mac: MacAddr) -> Option<String> {
        Some(String::from("Acme Corp"))
    }
}

pub struct NoVendor;

impl VendorRepository for NoVendor {
    fn vendor_for(&self, _mac: MacAddr) -> Option<String> {
        None
    }
}

/// A management agent that never answers.
pub struct NoTelemetry;

#[async_trait]
impl TelemetrySource for NoTelemetry {
    async fn collect(&self, _addr: Ipv4Addr) -> Option<DeviceTelemetry> {
        None
    }
}

/// Serves the same canned telemetry to every host.
pub struct FixedTelemetry(pub DeviceTelemetry);

#[async_trait]
impl TelemetrySource for FixedTelemetry {
    async fn collect(&self, _addr: Ipv4Addr) -> Option<DeviceTelemetry> {
        Some(self.0.clone())
    }
}
