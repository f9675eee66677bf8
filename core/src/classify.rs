//! # OS / Device Classifier
//!
//! Two sources feed the classification: the description text the management
//! agent hands back (explicit, preferred) and an active fingerprint scan
//! (heuristic, used when no description is available). Device-type rules are
//! ordered substring matches over the resolved text; the server-class rules
//! run first so a "Windows Server" or Linux host is not downgraded by the
//! broader workstation rule later in the chain.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use netinv_common::inventory::{Classification, DeviceType};
use netinv_common::probes::OsFingerprinter;

/// Combines the two classification sources into the final result.
pub fn classify(description: Option<&str>, fingerprint: Option<&str>) -> Classification {
    let source_text: Option<&str> = description.or(fingerprint);

    let os_name: String = match (description, fingerprint) {
        (Some(descr), _) => clean_os_name(descr),
        (None, Some(guess)) => guess.to_string(),
        (None, None) => String::from("Unknown"),
    };

    let device_type: DeviceType = source_text
        .map(device_type_for)
        .unwrap_or(DeviceType::Unknown);

    Classification {
        os_name,
        device_type,
    }
}

/// Ordered, case-insensitive substring rules; first match wins.
pub fn device_type_for(text: &str) -> DeviceType {
    let text = text.to_lowercase();

    if text.contains("windows server") {
        DeviceType::Server
    } else if text.contains("linux") || text.contains("unix") {
        DeviceType::Server
    } else if text.contains("windows") || text.contains("mac os") || text.contains("ios") {
        DeviceType::Workstation
    } else if text.contains("android") {
        DeviceType::Mobile
    } else if text.contains("router") || text.contains("switch") {
        DeviceType::NetworkDevice
    } else {
        DeviceType::Unknown
    }
}

/// Reduces a raw agent description to a familiar OS label, falling back to
/// the description's first token.
fn clean_os_name(description: &str) -> String {
    let lower = description.to_lowercase();

    if lower.contains("windows") {
        return String::from("Windows");
    }
    if lower.contains("linux") {
        return String::from("Linux");
    }
    if lower.contains("mac os") {
        return String::from("macOS");
    }
    if lower.contains("ios") {
        return String::from("iOS");
    }
    if lower.contains("android") {
        return String::from("Android");
    }

    description
        .split_whitespace()
        .next()
        .unwrap_or("Unknown")
        .to_string()
}

/// Substring check of the agent description against the approved firmware
/// list. `None` when no list is configured or no description came back.
pub fn firmware_compliant(description: Option<&str>, approved: &[String]) -> Option<bool> {
    if approved.is_empty() {
        return None;
    }
    let descr = description?;
    Some(approved.iter().any(|version| descr.contains(version.as_str())))
}

/// Active fingerprint probe shelling out to the external scanner.
///
/// The scan is bounded by its own timeout and the child is killed when the
/// future is dropped; a missing binary, a non-zero exit or unusable output
/// all resolve to `None`.
pub struct NmapFingerprinter {
    probe_timeout: Duration,
}

impl NmapFingerprinter {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

#[async_trait]
impl OsFingerprinter for NmapFingerprinter {
    async fn fingerprint(&self, addr: Ipv4Addr) -> Option<String> {
        let scan = Command::new("nmap")
            .args(["-O", "-Pn", "-n"])
            .arg(addr.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.probe_timeout, scan).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("fingerprint of {addr} failed to launch: {e}");
                return None;
            }
            Err(_) => {
                debug!("fingerprint of {addr} timed out");
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        parse_os_guess(&String::from_utf8_lossy(&output.stdout))
    }
}

/// First OS guess in the scanner's plain-text output.
fn parse_os_guess(stdout: &str) -> Option<String> {
    for prefix in ["OS details: ", "Running: "] {
        for line in stdout.lines() {
            if let Some(rest) = line.strip_prefix(prefix) {
                let first = rest.split(',').next().unwrap_or(rest);
                return Some(first.trim().to_string());
            }
        }
    }
    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
