use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::config::ScanConfig;
use sweepr_common::network::address::AddressSpec;
use sweepr_common::network::host::{HostReport, ProbeResult};
use sweepr_common::network::ports::PortSet;
use sweepr_common::network::target::{Protocol, ScanTarget};
use sweepr_core::probe::Prober;
use sweepr_core::scheduler::ScanScheduler;

/// Stands in for a network where only the listed host:port pairs accept.
struct FakeNetwork {
    listening: HashMap<Ipv4Addr, Vec<u16>>,
    probes: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeNetwork {
    fn new(listening: &[(Ipv4Addr, &[u16])]) -> Arc<Self> {
        Arc::new(Self {
            listening: listening
                .iter()
                .map(|(addr, ports)| (*addr, ports.to_vec()))
                .collect(),
            probes: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Prober for FakeNetwork {
    async fn probe(&self, target: ScanTarget) -> ProbeResult {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let accepts = target
            .port
            .zip(self.listening.get(&target.addr))
            .is_some_and(|(port, ports)| ports.contains(&port));
        if accepts {
            ProbeResult::port_open(&target)
        } else {
            ProbeResult::no_response(&target)
        }
    }
}

fn summaries(reports: &[HostReport], protocol: Protocol) -> Vec<(String, String)> {
    reports
        .iter()
        .map(|report| {
            (
                report.addr.to_string(),
                report.summary(protocol).unwrap_or_default(),
            )
        })
        .collect()
}

#[tokio::test]
async fn range_spec_to_host_reports() -> anyhow::Result<()> {
    let network = FakeNetwork::new(&[
        (Ipv4Addr::new(10, 0, 0, 1), &[80]),
        (Ipv4Addr::new(10, 0, 0, 2), &[443, 80]),
    ]);
    let hosts = "10.0.0.1-2".parse::<AddressSpec>()?.expand()?;
    let ports = PortSet::expand(["80,443"])?;

    let scheduler = ScanScheduler::new(network.clone(), &ScanConfig::default());
    let reports = scheduler.collect(hosts, &ports, Protocol::Tcp).await;

    assert_eq!(
        summaries(&reports, Protocol::Tcp),
        vec![
            ("10.0.0.1".to_string(), "80".to_string()),
            ("10.0.0.2".to_string(), "80,443".to_string()),
        ]
    );
    assert_eq!(network.probes.load(Ordering::SeqCst), 4);
    Ok(())
}

#[tokio::test]
async fn cidr_sweep_reports_only_listeners() -> anyhow::Result<()> {
    let network = FakeNetwork::new(&[
        (Ipv4Addr::new(192, 168, 7, 9), &[22]),
        (Ipv4Addr::new(192, 168, 7, 200), &[8080, 22]),
    ]);
    let hosts = AddressSpec::Cidr("192.168.7.0/24".into()).expand()?;
    assert_eq!(hosts.len(), 256);
    let ports = PortSet::expand(["22", "8080"])?;

    let cfg = ScanConfig::default().with_concurrency(8, 2);
    let scheduler = ScanScheduler::new(network.clone(), &cfg);
    let reports = scheduler.collect(hosts, &ports, Protocol::Tcp).await;

    assert_eq!(
        summaries(&reports, Protocol::Tcp),
        vec![
            ("192.168.7.9".to_string(), "22".to_string()),
            ("192.168.7.200".to_string(), "22,8080".to_string()),
        ]
    );
    assert_eq!(network.probes.load(Ordering::SeqCst), 512);
    assert!(network.peak.load(Ordering::SeqCst) <= cfg.max_in_flight());
    Ok(())
}

#[tokio::test]
async fn host_file_with_duplicates_scans_each_host_once() -> anyhow::Result<()> {
    let network = FakeNetwork::new(&[(Ipv4Addr::new(172, 16, 0, 4), &[53])]);
    let hosts = AddressSpec::from_lines("172.16.0.4\n 172.16.0.5 \n\n172.16.0.4\n").expand()?;
    let ports = PortSet::expand(["53"])?;

    let scheduler = ScanScheduler::new(network.clone(), &ScanConfig::default());
    let reports = scheduler.collect(hosts, &ports, Protocol::Udp).await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].open_ports(Protocol::Udp), vec![53]);
    assert_eq!(network.probes.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn bad_input_is_rejected_before_scanning() {
    assert!(AddressSpec::from_lines("10.0.0.1\nnot-an-ip\n").expand().is_err());
    assert!(AddressSpec::Cidr("10.0.0.0/32".into()).expand().is_err());
    assert!(PortSet::expand(["443-80"]).is_err());
}
