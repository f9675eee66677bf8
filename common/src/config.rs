//! Scan configuration.
//!
//! Every knob a scan needs travels in one read-only [`ScanConfig`] value:
//! target, credential, timeouts and the worker ceiling. Validation runs
//! before any probing; a [`ConfigError`] here is the only thing that aborts
//! a scan outright.

use std::time::Duration;

use crate::error::ConfigError;
use crate::network::target::Target;

/// Fallback ports tried in order when the echo probe goes unanswered.
pub const CONNECT_FALLBACK_PORTS: [u16; 5] = [445, 135, 139, 80, 22];

/// Well-known management agent port.
pub const DEFAULT_SNMP_PORT: u16 = 161;

pub const DEFAULT_WORKERS: usize = 20;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: Target,
    /// Shared-secret credential for the management protocol.
    pub community: String,
    pub snmp_port: u16,
    /// Ceiling on concurrently enriched hosts.
    pub workers: usize,
    /// Reply-collection window of the address-resolution sweep.
    pub discovery_window: Duration,
    pub echo_count: u32,
    pub echo_timeout: Duration,
    pub connect_timeout: Duration,
    pub snmp_timeout: Duration,
    /// Resends per management request on timeout (0 or 1).
    pub snmp_retries: usize,
    pub fingerprint_timeout: Duration,
    /// Optional bound on one host's whole enrichment.
    pub scan_deadline: Option<Duration>,
    /// Firmware versions considered compliant (substring match against the
    /// agent's system description). Empty list disables the check.
    pub approved_firmware: Vec<String>,
}

impl ScanConfig {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            community: String::from("public"),
            snmp_port: DEFAULT_SNMP_PORT,
            workers: DEFAULT_WORKERS,
            discovery_window: Duration::from_secs(3),
            echo_count: 3,
            echo_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(1),
            snmp_timeout: Duration::from_secs(2),
            snmp_retries: 1,
            fingerprint_timeout: Duration::from_secs(30),
            scan_deadline: None,
            approved_firmware: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.community.is_empty() {
            return Err(ConfigError::EmptyCommunity);
        }
        if !self.community.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ConfigError::MalformedCommunity);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.echo_count == 0 {
            return Err(ConfigError::NoEchoProbes);
        }
        Ok(())
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
