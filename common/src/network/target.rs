//! # Scan Target Model
//!
//! The unit of work handed to a single probe.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Which probe strategy a scan uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
    /// Link-layer reachability. Has no notion of ports.
    Arp,
}

impl Protocol {
    pub fn uses_ports(&self) -> bool {
        !matches!(self, Protocol::Arp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Arp => "arp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "arp" => Ok(Protocol::Arp),
            other => Err(format!("unknown protocol '{other}', expected tcp, udp or arp")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    pub addr: Ipv4Addr,
    pub port: Option<u16>,
    pub protocol: Protocol,
}

impl ScanTarget {
    pub fn new(addr: Ipv4Addr, port: u16, protocol: Protocol) -> Self {
        Self {
            addr,
            port: Some(port),
            protocol,
        }
    }

    /// Host-level target, used for ARP.
    pub fn host(addr: Ipv4Addr, protocol: Protocol) -> Self {
        Self {
            addr,
            port: None,
            protocol,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}/{}", self.addr, self.protocol),
            None => write!(f, "{}/{}", self.addr, self.protocol),
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

    #[test]
    fn protocol_parsing_is_case_insensitive() {
        assert_eq!("TCP".parse::<Protocol>(), Ok(Protocol::Tcp));
        assert_eq!(" udp ".parse::<Protocol>(), Ok(Protocol::Udp));
        assert_eq!("Arp".parse::<Protocol>(), Ok(Protocol::Arp));
        assert!("icmp".parse::<Protocol>().is_err());
    }

    #[test]
    fn only_arp_ignores_ports() {
        assert!(Protocol::Tcp.uses_ports());
        assert!(Protocol::Udp.uses_ports());
        assert!(!Protocol::Arp.uses_ports());
    }

    #[test]
    fn target_display() {
        let addr = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(ScanTarget::new(addr, 80, Protocol::Tcp).to_string(), "10.0.0.1:80/tcp");
        assert_eq!(ScanTarget::host(addr, Protocol::Arp).to_string(), "10.0.0.1/arp");
    }
}
