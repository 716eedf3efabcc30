//! Folds probe results into per-host reports.
//!
//! Results arrive in completion order from many concurrent probes; the
//! merged report does not depend on that order.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sweepr_common::network::host::{HostReport, ProbeResult};

#[derive(Debug, Default)]
pub struct ResultAggregator {
    hosts: Mutex<BTreeMap<Ipv4Addr, HostReport>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, result: ProbeResult) {
        self.lock()
            .entry(result.addr)
            .or_insert_with(|| HostReport::new(result.addr))
            .merge(result.protocol, result.outcome);
    }

    /// Removes and returns the report for a host whose probes have all
    /// finished. `None` when nothing positive was recorded.
    pub fn seal(&self, addr: Ipv4Addr) -> Option<HostReport> {
        self.lock().remove(&addr).filter(|report| !report.is_empty())
    }

    /// Drains every report still held, ordered by address, positive only.
    pub fn finalize(&self) -> Vec<HostReport> {
        std::mem::take(&mut *self.lock())
            .into_values()
            .filter(|report| !report.is_empty())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Ipv4Addr, HostReport>> {
        self.hosts.lock().unwrap_or_else(PoisonError::into_inner)
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
