use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::target::ScanTarget;

use crate::probe::Prober;

/// Full connect: a completed handshake means the port is open. The
/// connection is dropped straight away.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Prober for TcpProbe {
    async fn probe(&self, target: ScanTarget) -> ProbeResult {
        let Some(port) = target.port else {
            return ProbeResult::no_response(&target);
        };
        let socket_addr = SocketAddr::from((target.addr, port));

        match timeout(self.connect_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => ProbeResult::port_open(&target),
            Ok(Err(e)) => {
                trace!("{target}: {e}");
                ProbeResult::no_response(&target)
            }
            Err(_elapsed) => {
                trace!("{target}: no handshake within {:?}", self.connect_timeout);
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
