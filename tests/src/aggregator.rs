//! Aggregator guarantees: record count, ordering, bounded concurrency and
//! containment of per-host failures.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use netinv_common::inventory::{DeviceTelemetry, DeviceType, Reachability};
use netinv_common::probes::{OsFingerprinter, ReachabilityProbe, TelemetrySource};
use netinv_core::inventory::InventoryService;

use crate::support::{
    InvertedDelayProbe, NoFingerprint, NoTelemetry, NoVendor, StaticVendor, candidates, config,
};

#[tokio::test]
async fn one_record_per_candidate_in_discovery_order() {
    let input = candidates(8);
    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 8 }),
        Arc::new(NoFingerprint),
        Arc::new(StaticVendor),
        Arc::new(NoTelemetry),
        &config(),
    );

    let records = service.enrich_all(input.clone()).await;

    // Completion order is inverted by the probe delays, output order is not.
    assert_eq!(records.len(), input.len());
    for (candidate, record) in input.iter().zip(&records) {
        assert_eq!(record.addr, candidate.addr);
        assert_eq!(record.mac, candidate.mac);
        assert!(record.reachability.is_alive);
    }
}

/// Telemetry double that tracks how many collections run at once.
struct GaugedTelemetry {
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl TelemetrySource for GaugedTelemetry {
    async fn collect(&self, _addr: Ipv4Addr) -> Option<DeviceTelemetry> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        None
    }
}

#[tokio::test]
async fn worker_ceiling_bounds_concurrent_enrichment() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut cfg = config();
    cfg.workers = 3;

    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 12 }),
        Arc::new(NoFingerprint),
        Arc::new(StaticVendor),
        Arc::new(GaugedTelemetry {
            running: Arc::clone(&running),
            peak: Arc::clone(&peak),
        }),
        &cfg,
    );

    let records = service.enrich_all(candidates(12)).await;

    assert_eq!(records.len(), 12);
    let observed_peak = peak.load(Ordering::SeqCst);
    assert!(
        observed_peak <= 3,
        "peak concurrency {observed_peak} exceeded the worker ceiling"
    );
}

#[tokio::test]
async fn failed_sub_results_fall_back_to_defaults() {
    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 1 }),
        Arc::new(NoFingerprint),
        Arc::new(NoVendor),
        Arc::new(NoTelemetry),
        &config(),
    );

    let records = service.enrich_all(candidates(1)).await;
    let record = &records[0];

    assert_eq!(record.vendor, "Unknown");
    assert_eq!(record.classification.os_name, "Unknown");
    assert_eq!(record.classification.device_type, DeviceType::Unknown);
    assert_eq!(record.resources, None);
    assert!(record.interfaces.is_empty());
    assert_eq!(record.hostname, None);
    assert_eq!(record.firmware_compliant, None);
}

/// Probe that never finishes within any sane deadline.
struct HangingProbe;

#[async_trait]
impl ReachabilityProbe for HangingProbe {
    async fn probe(&self, _addr: Ipv4Addr) -> Reachability {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Reachability::unreachable()
    }
}

#[tokio::test]
async fn scan_deadline_yields_default_records_instead_of_hanging() {
    let mut cfg = config();
    cfg.scan_deadline = Some(Duration::from_millis(50));

    let service = InventoryService::new(
        Arc::new(HangingProbe),
        Arc::new(NoFingerprint),
        Arc::new(StaticVendor),
        Arc::new(NoTelemetry),
        &cfg,
    );

    let input = candidates(3);
    let records = service.enrich_all(input.clone()).await;

    assert_eq!(records.len(), 3);
    for (candidate, record) in input.iter().zip(&records) {
        assert_eq!(record.addr, candidate.addr);
        assert!(!record.reachability.is_alive);
    }
}

/// Fingerprinter that dies outright instead of degrading.
struct PanickingFingerprint;

#[async_trait]
impl OsFingerprinter for PanickingFingerprint {
    async fn fingerprint(&self, _addr: Ipv4Addr) -> Option<String> {
        panic!("fingerprint backend exploded");
    }
}

#[tokio::test]
async fn a_dying_host_task_does_not_abort_the_scan() {
    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 2 }),
        Arc::new(PanickingFingerprint),
        Arc::new(StaticVendor),
        Arc::new(NoTelemetry),
        &config(),
    );

    let input = candidates(2);
    let records = service.enrich_all(input.clone()).await;

    // Both hosts still produce a record; the panicking task degrades to the
    // defaults-only record.
    assert_eq!(records.len(), 2);
    for (candidate, record) in input.iter().zip(&records) {
        assert_eq!(record.addr, candidate.addr);
        assert_eq!(record.classification.os_name, "Unknown");
    }
}
