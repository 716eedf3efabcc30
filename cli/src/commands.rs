pub mod sweep;

use std::path::PathBuf;

use clap::Parser;
use sweepr_common::config::{DEFAULT_HOST_CONCURRENCY, DEFAULT_PER_HOST_CONCURRENCY};
use sweepr_common::network::address::AddressSpec;
use sweepr_common::network::target::Protocol;

#[derive(Parser, Debug)]
#[command(name = "sweepr", version)]
#[command(about = "Sweeps IPv4 hosts for open TCP/UDP ports or ARP reachability.")]
pub struct CommandLine {
    /// Hosts to scan: `10.0.0.0/24`, `10.0.0.1-50`, `10.0.0.1,10.0.0.9` or one address
    pub target: Option<AddressSpec>,

    /// Read hosts from a file, one IPv4 address per line
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Scan every address of a CIDR block
    #[arg(long, value_name = "NET/PREFIX")]
    pub cidr: Option<String>,

    /// First address of a range
    #[arg(long, value_name = "IP")]
    pub start: Option<String>,

    /// Last address of a range; may be shortened to its trailing octets
    #[arg(long, value_name = "IP", requires = "start")]
    pub end: Option<String>,

    /// Ports or port ranges, e.g. `22,80,8000-8100`. Defaults to well-known ports
    #[arg(short = 'p', long = "ports", value_name = "LIST")]
    pub ports: Vec<String>,

    /// Probe used against each target
    #[arg(short = 'P', long = "protocol", default_value_t = Protocol::Tcp)]
    pub protocol: Protocol,

    /// Hosts scanned at the same time
    #[arg(long = "hosts", value_name = "N", default_value_t = DEFAULT_HOST_CONCURRENCY)]
    pub max_hosts: usize,

    /// Concurrent probes per host
    #[arg(long = "per-host", value_name = "N", default_value_t = DEFAULT_PER_HOST_CONCURRENCY)]
    pub max_per_host: usize,

    /// More log output; repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less output; `-qq` prints one line per host
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn has_address_flags(&self) -> bool {
        self.input.is_some() || self.cidr.is_some() || self.start.is_some()
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
