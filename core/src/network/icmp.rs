//! ICMP echo, used as a liveness fallback when a UDP port stays silent.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tracing::{debug, trace};

const ECHO_PAYLOAD: [u8; 8] = [0; 8];

/// `true` when `addr` answers one echo request within `wait`.
///
/// Raw ICMP sockets may be refused to unprivileged users; that reads as
/// "not alive" and is only logged.
pub async fn echo(addr: Ipv4Addr, wait: Duration) -> bool {
    match tokio::time::timeout(wait, surge_ping::ping(IpAddr::V4(addr), &ECHO_PAYLOAD)).await {
        Ok(Ok((_reply, rtt))) => {
            trace!("{addr} answered ICMP echo in {rtt:?}");
            true
        }
        Ok(Err(e)) => {
            debug!("ICMP echo to {addr} failed: {e}");
            false
        }
        Err(_) => {
            trace!("ICMP echo to {addr} timed out after {wait:?}");
            false
        }
    }
}
