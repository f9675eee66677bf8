use clap::{Parser, Subcommand};

use netinv_common::config::{DEFAULT_SNMP_PORT, DEFAULT_WORKERS};
use netinv_common::network::target::Target;

#[derive(Parser)]
#[command(name = "netinv")]
#[command(about = "Network inventory scanner.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover and inventory every host in the target network
    #[command(alias = "s")]
    Scan {
        /// "lan", a host, a range (a.b.c.d-e) or a CIDR block
        target: Target,

        /// Management-protocol community string
        #[arg(short, long, default_value = "public")]
        community: String,

        /// Management-protocol port
        #[arg(long, default_value_t = DEFAULT_SNMP_PORT)]
        port: u16,

        /// Ceiling on concurrently enriched hosts
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Echo probes sent per host
        #[arg(long, default_value_t = 3)]
        echo_count: u32,

        /// Per-probe echo timeout in seconds
        #[arg(long, default_value_t = 1)]
        echo_timeout: u64,

        /// Per-request management-protocol timeout in seconds
        #[arg(long, default_value_t = 2)]
        snmp_timeout: u64,

        /// Per-host enrichment deadline in seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Firmware version considered compliant (repeatable)
        #[arg(long = "approved-firmware")]
        approved_firmware: Vec<String>,
    },

    /// Look up the manufacturer of a hardware address
    #[command(alias = "v")]
    Vendor { mac: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
