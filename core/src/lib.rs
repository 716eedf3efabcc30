//! Probing engine: per-protocol probes, the bounded-concurrency scheduler
//! that drives them, and the aggregator that folds their results into
//! per-host reports.

use std::net::Ipv4Addr;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::HostReport;
use sweepr_common::network::ports::PortSet;
use sweepr_common::network::target::Protocol;

pub mod aggregator;
pub mod network;
pub mod probe;
pub mod scheduler;

use scheduler::ScanScheduler;

/// Scans `hosts` with the stock probe for `protocol` and returns every
/// responsive host, ordered by address.
pub async fn scan(
    hosts: Vec<Ipv4Addr>,
    ports: &PortSet,
    protocol: Protocol,
    cfg: &ScanConfig,
) -> Vec<HostReport> {
    ScanScheduler::for_protocol(protocol, cfg)
        .collect(hosts, ports, protocol)
        .await
}
