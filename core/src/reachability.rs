//! # Reachability Checker
//!
//! Echo probes first; when every echo goes unanswered (or the echo socket
//! is unavailable), an ordered list of connect probes decides liveness.
//! This component never fails: every path resolves to a concrete
//! [`Reachability`] value.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tracing::{debug, warn};

use netinv_common::config::{CONNECT_FALLBACK_PORTS, ScanConfig};
use netinv_common::inventory::Reachability;
use netinv_common::probes::ReachabilityProbe;

use crate::network::tcp;

/// Raw outcome of one echo round before resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EchoStats {
    pub sent: u32,
    pub received: u32,
    pub avg_rtt_ms: Option<f64>,
}

/// Echo probe with connect-probe fallback.
pub struct IcmpTcpProbe {
    echo_client: Option<Client>,
    echo_count: u32,
    echo_timeout: Duration,
    connect_timeout: Duration,
}

impl IcmpTcpProbe {
    pub fn new(cfg: &ScanConfig) -> Self {
        let echo_client = match Client::new(&Config::default()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("echo probe unavailable ({e}), relying on connect fallback");
                None
            }
        };

        Self {
            echo_client,
            echo_count: cfg.echo_count,
            echo_timeout: cfg.echo_timeout,
            connect_timeout: cfg.connect_timeout,
        }
    }

    async fn echo_round(&self, client: &Client, addr: Ipv4Addr) -> EchoStats {
        let mut pinger = client
            .pinger(IpAddr::V4(addr), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(self.echo_timeout);

        let mut rtts: Vec<Duration> = Vec::new();
        for seq in 0..self.echo_count {
            match pinger.ping(PingSequence(seq as u16), &[0u8; 16]).await {
                Ok((_reply, rtt)) => rtts.push(rtt),
                Err(e) => debug!("echo {seq} to {addr} unanswered: {e}"),
            }
        }

        summarize_echo(self.echo_count, &rtts)
    }

    async fn connect_fallback(&self, addr: Ipv4Addr) -> bool {
        for port in CONNECT_FALLBACK_PORTS {
            if tcp::connect_probe(addr, port, self.connect_timeout).await {
                debug!("{addr} answered a connect probe on port {port}");
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl ReachabilityProbe for IcmpTcpProbe {
    async fn probe(&self, addr: Ipv4Addr) -> Reachability {
        let echo: Option<EchoStats> = match &self.echo_client {
            Some(client) => Some(self.echo_round(client, addr).await),
            None => None,
        };

        if let Some(stats) = echo {
            if stats.received > 0 {
                return resolve(Some(stats), false);
            }
        }

        let connect_ok = self.connect_fallback(addr).await;
        resolve(echo, connect_ok)
    }
}

pub(crate) fn summarize_echo(sent: u32, rtts: &[Duration]) -> EchoStats {
    let received = rtts.len() as u32;
    let avg_rtt_ms = if rtts.is_empty() {
        None
    } else {
        let total_ms: f64 = rtts.iter().map(|rtt| rtt.as_secs_f64() * 1000.0).sum();
        Some(total_ms / rtts.len() as f64)
    };

    EchoStats {
        sent,
        received,
        avg_rtt_ms,
    }
}

/// Folds the probe outcomes into the final value. An answered echo carries
/// RTT and loss; a connect fallback only proves liveness, so RTT stays
/// unmeasured and loss reads zero.
pub(crate) fn resolve(echo: Option<EchoStats>, connect_ok: bool) -> Reachability {
    if let Some(stats) = echo {
        if stats.received > 0 {
            let loss = 100.0 - (stats.received as f64 / stats.sent as f64) * 100.0;
            return Reachability {
                is_alive: true,
                avg_rtt_ms: stats.avg_rtt_ms,
                packet_loss_percent: loss,
            };
        }
    }

    if connect_ok {
        return Reachability {
            is_alive: true,
            avg_rtt_ms: None,
            packet_loss_percent: 0.0,
        };
    }

    Reachability::unreachable()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
