//! Bounded-concurrency driver for a scan.
//!
//! Two levels of [`Semaphore`] gate the work: one owned by the scheduler
//! that caps how many hosts are active, and one created per admitted host
//! that caps its concurrent probes. Hosts are admitted in input order, each
//! waiting for a free slot.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::HostReport;
use sweepr_common::network::ports::PortSet;
use sweepr_common::network::target::{Protocol, ScanTarget};

use crate::aggregator::ResultAggregator;
use crate::probe::{self, Prober};

const REPORT_QUEUE_LEN: usize = 64;

/// Called with the running count of finished hosts, responsive or not.
pub type HostDoneCallback = Arc<dyn Fn(usize) + Send + Sync>;

pub struct ScanScheduler {
    prober: Arc<dyn Prober>,
    host_slots: Arc<Semaphore>,
    max_per_host: usize,
    on_host_done: Option<HostDoneCallback>,
}

impl ScanScheduler {
    pub fn new(prober: Arc<dyn Prober>, cfg: &ScanConfig) -> Self {
        Self {
            prober,
            host_slots: Arc::new(Semaphore::new(cfg.max_host_concurrency.max(1))),
            max_per_host: cfg.max_per_host_concurrency.max(1),
            on_host_done: None,
        }
    }

    pub fn for_protocol(protocol: Protocol, cfg: &ScanConfig) -> Self {
        Self::new(probe::for_protocol(protocol, cfg), cfg)
    }

    pub fn on_host_done(mut self, callback: HostDoneCallback) -> Self {
        self.on_host_done = Some(callback);
        self
    }

    /// Starts the scan in the background and streams one report per
    /// responsive host, in completion order. The stream closes once every
    /// probe has finished.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(
        &self,
        hosts: Vec<Ipv4Addr>,
        ports: &PortSet,
        protocol: Protocol,
    ) -> Receiver<HostReport> {
        let (tx, rx) = mpsc::channel::<HostReport>(REPORT_QUEUE_LEN);

        let hosts: Vec<Ipv4Addr> = dedup_in_order(hosts);
        let ports: Arc<[u16]> = ports.as_slice().into();
        let job = HostJob {
            prober: self.prober.clone(),
            protocol,
            ports,
            // ARP resolves a host with a single probe.
            max_per_host: if protocol.uses_ports() { self.max_per_host } else { 1 },
            aggregator: Arc::new(ResultAggregator::new()),
            reports: tx,
            finished: Arc::new(AtomicUsize::new(0)),
            on_host_done: self.on_host_done.clone(),
        };
        let host_slots: Arc<Semaphore> = self.host_slots.clone();

        tokio::spawn(async move {
            debug!("scanning {} host(s) over {protocol}", hosts.len());
            let mut active: JoinSet<()> = JoinSet::new();

            for addr in hosts {
                let Ok(slot) = host_slots.clone().acquire_owned().await else {
                    warn!("host admission closed, stopping before {addr}");
                    break;
                };
                active.spawn(job.clone().scan_host(addr, slot));

                while let Some(joined) = active.try_join_next() {
                    log_join_failure(joined);
                }
            }

            while let Some(joined) = active.join_next().await {
                log_join_failure(joined);
            }
            debug!("scan over {protocol} complete");
        });

        rx
    }

    /// Runs the scan to completion and returns the reports ordered by address.
    pub async fn collect(
        &self,
        hosts: Vec<Ipv4Addr>,
        ports: &PortSet,
        protocol: Protocol,
    ) -> Vec<HostReport> {
        let mut rx = self.run(hosts, ports, protocol);
        let mut reports: Vec<HostReport> = Vec::new();
        while let Some(report) = rx.recv().await {
            reports.push(report);
        }
        reports.sort_by_key(|report| report.addr);
        reports
    }
}

/// Everything one host task needs, shared across hosts of the same run.
#[derive(Clone)]
struct HostJob {
    prober: Arc<dyn Prober>,
    protocol: Protocol,
    ports: Arc<[u16]>,
    max_per_host: usize,
    aggregator: Arc<ResultAggregator>,
    reports: Sender<HostReport>,
    finished: Arc<AtomicUsize>,
    on_host_done: Option<HostDoneCallback>,
}

impl HostJob {
    fn targets(&self, addr: Ipv4Addr) -> Vec<ScanTarget> {
        if self.protocol.uses_ports() {
            self.ports
                .iter()
                .map(|port| ScanTarget::new(addr, *port, self.protocol))
                .collect()
        } else {
            vec![ScanTarget::host(addr, self.protocol)]
        }
    }

    /// Probes every target of `addr`, then seals and emits its report.
    /// `_slot` is held until the host is done.
    async fn scan_host(self, addr: Ipv4Addr, _slot: OwnedSemaphorePermit) {
        let probe_slots = Arc::new(Semaphore::new(self.max_per_host));
        let mut probes: JoinSet<()> = JoinSet::new();

        for target in self.targets(addr) {
            let Ok(permit) = probe_slots.clone().acquire_owned().await else {
                break;
            };
            let prober = self.prober.clone();
            let aggregator = self.aggregator.clone();
            probes.spawn(async move {
                let result = prober.probe(target).await;
                trace!("{target} -> {:?}", result.outcome);
                aggregator.add(result);
                drop(permit);
            });
        }

        while let Some(joined) = probes.join_next().await {
            log_join_failure(joined);
        }

        if let Some(report) = self.aggregator.seal(addr) {
            info!("{addr} responded");
            if self.reports.send(report).await.is_err() {
                debug!("report receiver dropped, discarding {addr}");
            }
        }

        let done: usize = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(callback) = &self.on_host_done {
            callback(done);
        }
    }
}

fn dedup_in_order(hosts: Vec<Ipv4Addr>) -> Vec<Ipv4Addr> {
    let mut seen: HashSet<Ipv4Addr> = HashSet::with_capacity(hosts.len());
    hosts.into_iter().filter(|addr| seen.insert(*addr)).collect()
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!("scan task failed: {e}");
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
