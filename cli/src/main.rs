mod commands;
mod terminal;

use std::time::Duration;

use anyhow::bail;
use pnet::util::MacAddr;

use commands::{CommandLine, Commands};
use netinv_common::config::ScanConfig;
use netinv_common::probes::VendorRepository;
use netinv_core::scan;
use netinv_core::vendors::OuiVendorRepo;
use terminal::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    terminal::logging::init();

    match commands.command {
        Commands::Scan {
            target,
            community,
            port,
            workers,
            echo_count,
            echo_timeout,
            snmp_timeout,
            deadline,
            approved_firmware,
        } => {
            if !(unsafe { libc::geteuid() } == 0) {
                bail!("the discovery sweep needs root privileges for raw link-layer access");
            }

            let mut cfg = ScanConfig::new(target);
            cfg.community = community;
            cfg.snmp_port = port;
            cfg.workers = workers;
            cfg.echo_count = echo_count;
            cfg.echo_timeout = Duration::from_secs(echo_timeout);
            cfg.snmp_timeout = Duration::from_secs(snmp_timeout);
            cfg.scan_deadline = deadline.map(Duration::from_secs);
            cfg.approved_firmware = approved_firmware;

            let spinner = report::scan_spinner();
            let records = scan::run_scan(&cfg).await?;
            spinner.finish_and_clear();

            report::render(&records);
            Ok(())
        }

        Commands::Vendor { mac } => {
            let mac: MacAddr = mac
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid hardware address '{mac}': {e:?}"))?;

            let repo = OuiVendorRepo::new();
            let vendor = repo
                .vendor_for(mac)
                .unwrap_or_else(|| String::from("Unknown"));
            println!("{vendor}");
            Ok(())
        }
    }
}
