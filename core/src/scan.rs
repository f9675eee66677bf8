//! Scan entry point.

use tracing::info;

use netinv_common::config::ScanConfig;
use netinv_common::inventory::{DeviceRecord, HostCandidate};

use crate::discovery;
use crate::inventory::InventoryService;

/// Runs one full scan: validate, sweep, enrich.
///
/// Configuration problems abort here, before any probing. Everything after
/// that is contained per host, and the returned records match the discovered
/// candidates one to one, in discovery order.
pub async fn run_scan(cfg: &ScanConfig) -> anyhow::Result<Vec<DeviceRecord>> {
    cfg.validate()?;

    let candidates: Vec<HostCandidate> = discovery::discover(cfg).await?;
    info!("{} hosts answered the sweep", candidates.len());

    let service = InventoryService::with_defaults(cfg);
    Ok(service.enrich_all(candidates).await)
}
