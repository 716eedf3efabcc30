use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::target::ScanTarget;
use sweepr_protocols::udp;

use crate::network::icmp;
use crate::probe::Prober;

const RECV_BUFFER_LEN: usize = 1024;

/// Decides whether a host is up when one of its UDP ports said nothing.
#[async_trait]
pub trait Liveness: Send + Sync {
    async fn is_alive(&self, addr: Ipv4Addr) -> bool;
}

/// One ICMP echo request.
#[derive(Debug, Clone)]
pub struct IcmpEcho {
    wait: Duration,
}

#[async_trait]
impl Liveness for IcmpEcho {
    async fn is_alive(&self, addr: Ipv4Addr) -> bool {
        icmp::echo(addr, self.wait).await
    }
}

enum Exchange {
    Answered,
    Silent,
}

/// Sends a timestamp datagram and waits for anything to come back.
///
/// A silent port on a host that still answers the liveness check is counted
/// as open, since most UDP services only reply to well-formed requests.
/// Explicit rejections (ICMP port unreachable surfacing as a socket error)
/// count as no response.
pub struct UdpProbe {
    recv_timeout: Duration,
    liveness: Arc<dyn Liveness>,
}

impl UdpProbe {
    pub fn new(recv_timeout: Duration, icmp_timeout: Duration) -> Self {
        Self::with_liveness(recv_timeout, Arc::new(IcmpEcho { wait: icmp_timeout }))
    }

    pub fn with_liveness(recv_timeout: Duration, liveness: Arc<dyn Liveness>) -> Self {
        Self {
            recv_timeout,
            liveness,
        }
    }

    async fn exchange(&self, addr: Ipv4Addr, port: u16) -> io::Result<Exchange> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect((addr, port)).await?;
        socket.send(&udp::probe_payload()).await?;

        let mut buffer = [0u8; RECV_BUFFER_LEN];
        match timeout(self.recv_timeout, socket.recv(&mut buffer)).await {
            Ok(Ok(_len)) => Ok(Exchange::Answered),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(Exchange::Silent),
        }
    }
}

#[async_trait]
impl Prober for UdpProbe {
    async fn probe(&self, target: ScanTarget) -> ProbeResult {
        let Some(port) = target.port else {
            return ProbeResult::no_response(&target);
        };

        match self.exchange(target.addr, port).await {
            Ok(Exchange::Answered) => ProbeResult::port_open(&target),
            Ok(Exchange::Silent) => {
                if self.liveness.is_alive(target.addr).await {
                    trace!("{target}: silent, host is alive");
                    ProbeResult::port_open(&target)
                } else {
                    ProbeResult::no_response(&target)
                }
            }
            Err(e) => {
                trace!("{target}: {e}");
                ProbeResult::no_response(&target)
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use sweepr_common::network::host::Outcome;
    use sweepr_common::network::target::Protocol;

    const WAIT: Duration = Duration::from_millis(200);

    struct FixedLiveness {
        alive: bool,
        calls: AtomicUsize,
    }

    impl FixedLiveness {
        fn new(alive: bool) -> Arc<Self> {
            Arc::new(Self {
                alive,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Liveness for FixedLiveness {
        async fn is_alive(&self, _addr: Ipv4Addr) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.alive
        }
    }

    async fn echo_server() -> u16 {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buffer = [0u8; 64];
            if let Ok((len, peer)) = socket.recv_from(&mut buffer).await {
                let _ = socket.send_to(&buffer[..len], peer).await;
            }
        });
        port
    }

    #[tokio::test]
    async fn reply_means_open_without_liveness_check() {
        let port = echo_server().await;
        let liveness = FixedLiveness::new(false);
        let probe = UdpProbe::with_liveness(WAIT, liveness.clone());

        let result = probe
            .probe(ScanTarget::new(Ipv4Addr::LOCALHOST, port, Protocol::Udp))
            .await;
        assert_eq!(result.outcome, Outcome::PortOpen(port));
        assert_eq!(liveness.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn silent_port_on_live_host_is_open() {
        // Kept alive for the whole test so the datagram is swallowed.
        let sink = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = sink.local_addr().unwrap().port();
        let liveness = FixedLiveness::new(true);
        let probe = UdpProbe::with_liveness(WAIT, liveness.clone());

        let result = probe
            .probe(ScanTarget::new(Ipv4Addr::LOCALHOST, port, Protocol::Udp))
            .await;
        assert_eq!(result.outcome, Outcome::PortOpen(port));
        assert_eq!(liveness.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn silent_port_on_dead_host_is_no_response() {
        let sink = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = sink.local_addr().unwrap().port();
        let probe = UdpProbe::with_liveness(WAIT, FixedLiveness::new(false));

        let result = probe
            .probe(ScanTarget::new(Ipv4Addr::LOCALHOST, port, Protocol::Udp))
            .await;
        assert_eq!(result.outcome, Outcome::NoResponse);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn unreachable_port_is_no_response() {
        let port = {
            let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            socket.local_addr().unwrap().port()
        };
        let liveness = FixedLiveness::new(true);
        let probe = UdpProbe::with_liveness(WAIT, liveness.clone());

        let result = probe
            .probe(ScanTarget::new(Ipv4Addr::LOCALHOST, port, Protocol::Udp))
            .await;
        assert_eq!(result.outcome, Outcome::NoResponse);
        assert_eq!(liveness.calls.load(Ordering::SeqCst), 0);
    }
}
