//! Seams between the inventory aggregator and the concrete probes.
//!
//! The aggregator only ever sees these traits; the real implementations live
//! in the core crate and the tests substitute in-memory doubles. All of them
//! are infallible by contract: a probe that cannot deliver resolves to a
//! default or absent value instead of an error.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use pnet::util::MacAddr;

use crate::inventory::{DeviceTelemetry, Reachability};

#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Liveness check for one host. Every failure path resolves to a
    /// concrete [`Reachability`] value.
    async fn probe(&self, addr: Ipv4Addr) -> Reachability;
}

#[async_trait]
pub trait OsFingerprinter: Send + Sync {
    /// Best-effort OS guess from an active fingerprint scan.
    async fn fingerprint(&self, addr: Ipv4Addr) -> Option<String>;
}

pub trait VendorRepository: Send + Sync {
    /// Manufacturer for a hardware address, if the registry knows the prefix.
    fn vendor_for(&self, mac: MacAddr) -> Option<String>;
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Resource and interface statistics for one device.
    ///
    /// `None` means the management agent was unreachable as a whole;
    /// partial data comes back as a telemetry value with absent fields.
    async fn collect(&self, addr: Ipv4Addr) -> Option<DeviceTelemetry>;
}
