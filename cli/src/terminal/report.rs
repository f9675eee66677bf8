//! Renders the ordered inventory for the terminal.
//!
//! This is the stand-in for an external exporter: it consumes the finished
//! record list and never reaches back into the pipeline.

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use netinv_common::inventory::{DeviceRecord, PortStatus};

pub fn scan_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message("scanning the network");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn render(records: &[DeviceRecord]) {
    if records.is_empty() {
        println!("{}", "no hosts answered the sweep".yellow());
        return;
    }

    for (idx, record) in records.iter().enumerate() {
        print_record(idx, record);
        if idx + 1 != records.len() {
            println!();
        }
    }

    println!();
    let summary: ColoredString = format!("{} hosts inventoried", records.len()).bold().green();
    println!("{summary}");
}

fn print_record(idx: usize, record: &DeviceRecord) {
    let name = record.hostname.as_deref().unwrap_or("no hostname");
    println!(
        "[{}] {} {}",
        idx.to_string().cyan(),
        record.addr.to_string().bold(),
        name.dimmed()
    );

    detail("MAC", &record.mac.to_string());
    detail("Vendor", &record.vendor);
    detail("OS", &record.classification.os_name);
    detail("Type", &record.classification.device_type.to_string());
    detail("Status", &status_line(record));

    if let Some(resources) = &record.resources {
        if let Some(cpu) = resources.cpu_load_percent {
            detail("CPU", &format!("{cpu:.1} %"));
        }
        if let Some(mem) = resources.memory_used_percent {
            detail("Memory", &format!("{mem:.1} %"));
        }
    }

    if let Some(compliant) = record.firmware_compliant {
        let verdict = if compliant {
            "compliant".green()
        } else {
            "non-compliant".red()
        };
        detail("Firmware", &verdict.to_string());
    }

    if !record.interfaces.is_empty() {
        detail("Interfaces", &record.interfaces.len().to_string());
        for stats in record.interfaces.values() {
            let status = match stats.oper_status {
                PortStatus::Up => "up".green(),
                PortStatus::Down => "down".red(),
            };
            let octets = match (stats.in_octets, stats.out_octets) {
                (Some(rx), Some(tx)) => format!("rx {rx} B / tx {tx} B"),
                _ => String::from("counters unavailable"),
            };
            println!(
                "      {:>3} {} [{}] {}",
                stats.index,
                stats.description,
                status,
                octets.dimmed()
            );
        }
    }
}

fn status_line(record: &DeviceRecord) -> String {
    if !record.reachability.is_alive {
        return String::from("offline");
    }

    match record.reachability.avg_rtt_ms {
        Some(rtt) => format!(
            "online, {:.1} ms avg rtt, {:.0} % loss",
            rtt, record.reachability.packet_loss_percent
        ),
        None => String::from("online (connect probe)"),
    }
}

fn detail(key: &str, value: &str) {
    let padded = format!("{:<10}", format!("{key}:"));
    println!("    {} {}", padded.bright_black(), value);
}
