//! # Inventory Aggregator
//!
//! Fans every discovered candidate out to the enrichment probes under a
//! bounded worker pool and merges the results into exactly one record per
//! host. Records come out in discovery order no matter how the per-host
//! tasks complete, and no single host's failure can abort the scan.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::warn;

use netinv_common::config::ScanConfig;
use netinv_common::inventory::{
    DeviceRecord, DeviceTelemetry, HostCandidate, Reachability, SystemInfo,
};
use netinv_common::probes::{
    OsFingerprinter, ReachabilityProbe, TelemetrySource, VendorRepository,
};

use crate::classify::{self, NmapFingerprinter};
use crate::reachability::IcmpTcpProbe;
use crate::telemetry::SnmpCollector;
use crate::vendors::OuiVendorRepo;

pub struct InventoryService {
    reachability: Arc<dyn ReachabilityProbe>,
    fingerprinter: Arc<dyn OsFingerprinter>,
    vendors: Arc<dyn VendorRepository>,
    telemetry: Arc<dyn TelemetrySource>,
    workers: usize,
    host_deadline: Option<Duration>,
    approved_firmware: Arc<Vec<String>>,
}

impl InventoryService {
    pub fn new(
        reachability: Arc<dyn ReachabilityProbe>,
        fingerprinter: Arc<dyn OsFingerprinter>,
        vendors: Arc<dyn VendorRepository>,
        telemetry: Arc<dyn TelemetrySource>,
        cfg: &ScanConfig,
    ) -> Self {
        Self {
            reachability,
            fingerprinter,
            vendors,
            telemetry,
            workers: cfg.workers,
            host_deadline: cfg.scan_deadline,
            approved_firmware: Arc::new(cfg.approved_firmware.clone()),
        }
    }

    /// Service wired with the real probes.
    pub fn with_defaults(cfg: &ScanConfig) -> Self {
        Self::new(
            Arc::new(IcmpTcpProbe::new(cfg)),
            Arc::new(NmapFingerprinter::new(cfg.fingerprint_timeout)),
            Arc::new(OuiVendorRepo::new()),
            Arc::new(SnmpCollector::new(cfg)),
            cfg,
        )
    }

    /// Enriches every candidate and returns exactly one record per
    /// candidate, ordered as discovered. Completion order of the per-host
    /// tasks is not observable in the output.
    pub async fn enrich_all(&self, candidates: Vec<HostCandidate>) -> Vec<DeviceRecord> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles: Vec<JoinHandle<DeviceRecord>> = Vec::with_capacity(candidates.len());

        for candidate in candidates.iter().copied() {
            let semaphore = Arc::clone(&semaphore);
            let reachability = Arc::clone(&self.reachability);
            let fingerprinter = Arc::clone(&self.fingerprinter);
            let vendors = Arc::clone(&self.vendors);
            let telemetry = Arc::clone(&self.telemetry);
            let approved = Arc::clone(&self.approved_firmware);
            let deadline = self.host_deadline;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();

                let enrich = enrich_host(
                    candidate,
                    reachability,
                    fingerprinter,
                    vendors,
                    telemetry,
                    &approved,
                );

                match deadline {
                    Some(limit) => match tokio::time::timeout(limit, enrich).await {
                        Ok(record) => record,
                        Err(_) => {
                            warn!("enrichment of {} hit the scan deadline", candidate.addr);
                            DeviceRecord::offline(&candidate)
                        }
                    },
                    None => enrich.await,
                }
            }));
        }

        // Awaiting in submission order pins the output to discovery order.
        let mut records: Vec<DeviceRecord> = Vec::with_capacity(candidates.len());
        for (candidate, handle) in candidates.iter().zip(handles) {
            let record = match handle.await {
                Ok(record) => record,
                Err(e) => {
                    warn!("enrichment task for {} died: {e}", candidate.addr);
                    DeviceRecord::offline(candidate)
                }
            };
            records.push(record);
        }

        records
    }
}

async fn enrich_host(
    candidate: HostCandidate,
    reachability: Arc<dyn ReachabilityProbe>,
    fingerprinter: Arc<dyn OsFingerprinter>,
    vendors: Arc<dyn VendorRepository>,
    telemetry: Arc<dyn TelemetrySource>,
    approved_firmware: &[String],
) -> DeviceRecord {
    // The network probes touch disjoint external resources and run together.
    let (reach, fingerprint, telemetry_data) = tokio::join!(
        reachability.probe(candidate.addr),
        fingerprinter.fingerprint(candidate.addr),
        telemetry.collect(candidate.addr),
    );

    let vendor = vendors
        .vendor_for(candidate.mac)
        .unwrap_or_else(|| String::from("Unknown"));

    merge_record(
        candidate,
        vendor,
        reach,
        fingerprint,
        telemetry_data,
        approved_firmware,
    )
}

/// Merges the sub-results into the one immutable record for this host,
/// substituting defaults for anything that failed.
fn merge_record(
    candidate: HostCandidate,
    vendor: String,
    reachability: Reachability,
    fingerprint: Option<String>,
    telemetry: Option<DeviceTelemetry>,
    approved_firmware: &[String],
) -> DeviceRecord {
    let (system, resources, interfaces) = match telemetry {
        Some(data) => (data.system, Some(data.resources), data.interfaces),
        None => (SystemInfo::default(), None, BTreeMap::new()),
    };

    let classification =
        classify::classify(system.description.as_deref(), fingerprint.as_deref());
    let firmware_compliant =
        classify::firmware_compliant(system.description.as_deref(), approved_firmware);

    DeviceRecord {
        addr: candidate.addr,
        mac: candidate.mac,
        vendor,
        hostname: system.name,
        reachability,
        classification,
        resources,
        interfaces,
        firmware_compliant,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
