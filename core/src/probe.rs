//! The **abstraction** every probing technique implements.
//!
//! The scheduler only ever talks to a [`Prober`]; which concrete probe sits
//! behind it is decided once, from the requested [`Protocol`]. Tests swap in
//! their own implementations to drive the scheduler without touching the
//! network.

use std::sync::Arc;

use async_trait::async_trait;
use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::target::{Protocol, ScanTarget};

pub mod arp;
pub mod tcp;
pub mod udp;

pub use arp::ArpProbe;
pub use tcp::TcpProbe;
pub use udp::UdpProbe;

/// Sends one stimulus to one target and classifies what came back.
///
/// Probes never fail: anything that goes wrong on the way (refused
/// connections, missing privileges, timeouts) is reported as
/// [`Outcome::NoResponse`](sweepr_common::network::host::Outcome::NoResponse).
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: ScanTarget) -> ProbeResult;
}

/// The stock probe for `protocol`, with timeouts taken from `cfg`.
pub fn for_protocol(protocol: Protocol, cfg: &ScanConfig) -> Arc<dyn Prober> {
    match protocol {
        Protocol::Tcp => Arc::new(TcpProbe::new(cfg.tcp_timeout)),
        Protocol::Udp => Arc::new(UdpProbe::new(cfg.udp_timeout, cfg.icmp_timeout)),
        Protocol::Arp => Arc::new(ArpProbe::new(cfg.arp_timeout)),
    }
}
