//! # Probe Results and Host Reports
//!
//! A [`ProbeResult`] is what one probe observed. A [`HostReport`] is the
//! merged, positive-only view of every result for one address.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use crate::network::target::{Protocol, ScanTarget};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    PortOpen(u16),
    /// Formatted as `AA:BB:CC:DD:EE:FF`.
    MacResolved(String),
    /// Closed, filtered, timed out or unresolvable. Deliberately not told apart.
    NoResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub addr: Ipv4Addr,
    pub protocol: Protocol,
    pub outcome: Outcome,
}

impl ProbeResult {
    pub fn new(addr: Ipv4Addr, protocol: Protocol, outcome: Outcome) -> Self {
        Self {
            addr,
            protocol,
            outcome,
        }
    }

    pub fn no_response(target: &ScanTarget) -> Self {
        Self::new(target.addr, target.protocol, Outcome::NoResponse)
    }

    /// `PortOpen` for the target's port; a portless target counts as no response.
    pub fn port_open(target: &ScanTarget) -> Self {
        match target.port {
            Some(port) => Self::new(target.addr, target.protocol, Outcome::PortOpen(port)),
            None => Self::no_response(target),
        }
    }

    pub fn mac_resolved(target: &ScanTarget, mac: String) -> Self {
        Self::new(target.addr, target.protocol, Outcome::MacResolved(mac))
    }
}

/// What was collected for one protocol on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Findings {
    OpenPorts(BTreeSet<u16>),
    Mac(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub addr: Ipv4Addr,
    pub findings: BTreeMap<Protocol, Findings>,
}

impl HostReport {
    pub fn new(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            findings: BTreeMap::new(),
        }
    }

    /// Folds one outcome into the report. Merging is order-insensitive:
    /// ports accumulate into a set and the first MAC seen is kept.
    pub fn merge(&mut self, protocol: Protocol, outcome: Outcome) {
        match outcome {
            Outcome::PortOpen(port) => {
                let entry = self
                    .findings
                    .entry(protocol)
                    .or_insert_with(|| Findings::OpenPorts(BTreeSet::new()));
                if let Findings::OpenPorts(ports) = entry {
                    ports.insert(port);
                }
            }
            Outcome::MacResolved(mac) => {
                self.findings.entry(protocol).or_insert(Findings::Mac(mac));
            }
            Outcome::NoResponse => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Ascending open ports for `protocol`.
    pub fn open_ports(&self, protocol: Protocol) -> Vec<u16> {
        match self.findings.get(&protocol) {
            Some(Findings::OpenPorts(ports)) => ports.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    pub fn mac(&self) -> Option<&str> {
        self.findings.values().find_map(|finding| match finding {
            Findings::Mac(mac) => Some(mac.as_str()),
            Findings::OpenPorts(_) => None,
        })
    }

    /// `"22,80,443"` for port scans, the MAC address for ARP.
    pub fn summary(&self, protocol: Protocol) -> Option<String> {
        match self.findings.get(&protocol)? {
            Findings::OpenPorts(ports) => Some(
                ports
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<String>>()
                    .join(","),
            ),
            Findings::Mac(mac) => Some(mac.clone()),
        }
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
