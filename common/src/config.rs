use std::time::Duration;

use crate::error::ScanError;

pub const DEFAULT_HOST_CONCURRENCY: usize = 5;
pub const DEFAULT_PER_HOST_CONCURRENCY: usize = 5;

pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const UDP_RECV_TIMEOUT: Duration = Duration::from_millis(500);
pub const ICMP_ECHO_TIMEOUT: Duration = Duration::from_millis(1_000);
pub const ARP_REPLY_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Knobs for a single scan run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Hosts being scanned at the same time.
    pub max_host_concurrency: usize,
    /// Probes in flight for one host.
    ///
    /// Ignored for ARP, which sends exactly one probe per host.
    pub max_per_host_concurrency: usize,
    pub tcp_timeout: Duration,
    pub udp_timeout: Duration,
    /// Budget for the ICMP echo used as a UDP liveness fallback.
    pub icmp_timeout: Duration,
    pub arp_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_host_concurrency: DEFAULT_HOST_CONCURRENCY,
            max_per_host_concurrency: DEFAULT_PER_HOST_CONCURRENCY,
            tcp_timeout: TCP_CONNECT_TIMEOUT,
            udp_timeout: UDP_RECV_TIMEOUT,
            icmp_timeout: ICMP_ECHO_TIMEOUT,
            arp_timeout: ARP_REPLY_TIMEOUT,
        }
    }
}

impl ScanConfig {
    pub fn with_concurrency(mut self, hosts: usize, per_host: usize) -> Self {
        self.max_host_concurrency = hosts;
        self.max_per_host_concurrency = per_host;
        self
    }

    /// Upper bound on socket operations in flight across the whole scan.
    pub fn max_in_flight(&self) -> usize {
        self.max_host_concurrency * self.max_per_host_concurrency
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_host_concurrency == 0 || self.max_per_host_concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency limits must be at least 1".to_string(),
            ));
        }
        Ok(())
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

    #[test]
    fn default_ceiling_is_twenty_five() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.max_in_flight(), 25);
        assert_eq!(cfg.tcp_timeout, Duration::from_millis(500));
        assert_eq!(cfg.udp_timeout, Duration::from_millis(500));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = ScanConfig::default().with_concurrency(0, 5);
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));

        let cfg = ScanConfig::default().with_concurrency(2, 2);
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.max_in_flight(), 4);
    }
}
