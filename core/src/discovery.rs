//! # Discovery Prober
//!
//! Finds live hosts by broadcasting an address-resolution request for every
//! swept address and collecting replies within a bounded window. Any reply
//! is accepted as presence; there are no retries, and hosts that silently
//! drop the probe stay invisible. Requires a privileged datalink channel.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use pnet::datalink::{MacAddr, NetworkInterface};
use tracing::{debug, info, warn};

use netinv_common::config::ScanConfig;
use netinv_common::inventory::HostCandidate;
use netinv_common::network::interface::{self, NetworkInterfaceExt};
use netinv_protocols::arp;

use crate::network::channel::{self, EthernetHandle};

/// Sweeps the configured target and returns the candidates in reply-arrival
/// order, deduplicated by address (first reply wins).
///
/// An empty result is a valid outcome, not an error.
pub async fn discover(cfg: &ScanConfig) -> anyhow::Result<Vec<HostCandidate>> {
    let targets: Vec<Ipv4Addr> = cfg.target.resolve_addrs()?;
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let intf: NetworkInterface = interface::interface_for(targets[0])?;
    let src_mac: MacAddr = intf.mac.context("interface has no MAC address")?;
    let src_addr: Ipv4Addr = intf
        .first_ipv4()
        .with_context(|| format!("interface {} has no IPv4 address", intf.name))?;

    let mut handle: EthernetHandle = channel::start_capture(&intf)?;

    info!("sweeping {} addresses on {}", targets.len(), intf.name);
    send_requests(&mut handle, src_mac, src_addr, &targets);

    Ok(collect_replies(&mut handle, src_mac, &targets, cfg.discovery_window).await)
}

fn send_requests(
    handle: &mut EthernetHandle,
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    targets: &[Ipv4Addr],
) {
    for target in targets {
        match arp::build_request(src_mac, src_addr, *target) {
            Ok(frame) => {
                handle.tx.send_to(&frame, None);
            }
            Err(e) => warn!("skipping {target}: {e}"),
        }
    }
}

async fn collect_replies(
    handle: &mut EthernetHandle,
    own_mac: MacAddr,
    targets: &[Ipv4Addr],
    window: Duration,
) -> Vec<HostCandidate> {
    let target_set: HashSet<Ipv4Addr> = targets.iter().copied().collect();
    let mut seen: HashSet<Ipv4Addr> = HashSet::new();
    let mut candidates: Vec<HostCandidate> = Vec::new();

    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            frame = handle.rx.recv() => {
                let Some(frame) = frame else { break };
                if let Some(candidate) = candidate_from_frame(&frame, own_mac, &target_set) {
                    if seen.insert(candidate.addr) {
                        debug!("reply from {} ({})", candidate.addr, candidate.mac);
                        candidates.push(candidate);
                    }
                }
                if seen.len() == target_set.len() {
                    break;
                }
            }

            _ = &mut deadline => break,
        }
    }

    candidates
}

/// Reply frames from swept addresses become candidates; everything else on
/// the wire, including our own transmissions, is dropped.
fn candidate_from_frame(
    frame: &[u8],
    own_mac: MacAddr,
    targets: &HashSet<Ipv4Addr>,
) -> Option<HostCandidate> {
    let (addr, mac) = arp::parse_reply(frame)?;
    if mac == own_mac || !targets.contains(&addr) {
        return None;
    }
    Some(HostCandidate { addr, mac })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
