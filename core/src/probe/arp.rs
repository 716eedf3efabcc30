use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;
use tracing::debug;

use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::interface;
use sweepr_common::network::mac::format_mac;
use sweepr_common::network::target::ScanTarget;

use crate::network::channel;
use crate::probe::Prober;

/// Resolves the target's hardware address on the local segment.
#[derive(Debug, Clone)]
pub struct ArpProbe {
    reply_timeout: Duration,
}

impl ArpProbe {
    pub fn new(reply_timeout: Duration) -> Self {
        Self { reply_timeout }
    }
}

#[async_trait]
impl Prober for ArpProbe {
    async fn probe(&self, target: ScanTarget) -> ProbeResult {
        let addr: Ipv4Addr = target.addr;
        let wait: Duration = self.reply_timeout;

        // Datalink reads block, so they stay off the async workers.
        let resolved = tokio::task::spawn_blocking(move || resolve(addr, wait)).await;

        match resolved {
            Ok(Ok(mac)) => ProbeResult::mac_resolved(&target, format_mac(mac)),
            Ok(Err(e)) => {
                debug!("ARP for {addr}: {e:#}");
                ProbeResult::no_response(&target)
            }
            Err(e) => {
                debug!("ARP task for {addr} did not complete: {e}");
                ProbeResult::no_response(&target)
            }
        }
    }
}

fn resolve(addr: Ipv4Addr, wait: Duration) -> anyhow::Result<MacAddr> {
    let intf: NetworkInterface =
        interface::interface_for(addr).context("no usable interface for ARP")?;
    let src_mac: MacAddr = intf
        .mac
        .with_context(|| format!("{} has no hardware address", intf.name))?;

    let mut handle = channel::start_capture(&intf)?;
    channel::resolve_mac(&mut handle, src_mac, addr, wait)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
