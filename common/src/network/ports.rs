//! # Port Specification
//!
//! Turns entries such as `"80"`, `"90-102"` or `"22,80,443"` into an ordered,
//! duplicate-free [`PortSet`].

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;

/// Scanned when no ports are given.
pub const WELL_KNOWN_PORTS: [u16; 33] = [
    20, 21, 22, 23, 25, 53, 67, 68, 69, 80, 110, 111, 123, 135, 137, 138, 139, 143, 161, 162, 389,
    443, 445, 465, 514, 587, 631, 993, 995, 1433, 3306, 3389, 8080,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    /// Inclusive, `lo <= hi`.
    Range { lo: u16, hi: u16 },
}

impl PortSpec {
    pub fn ports(&self) -> RangeInclusive<u16> {
        match *self {
            PortSpec::Single(port) => port..=port,
            PortSpec::Range { lo, hi } => lo..=hi,
        }
    }
}

impl FromStr for PortSpec {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let Some((lo_str, hi_str)) = s.split_once('-') else {
            return parse_port(s).map(PortSpec::Single);
        };

        let lo: u16 = parse_port(lo_str)?;
        let hi: u16 = parse_port(hi_str)?;
        if hi < lo {
            return Err(ScanError::port(format!("inverted port range '{s}'")));
        }

        Ok(PortSpec::Range { lo, hi })
    }
}

fn parse_port(s: &str) -> Result<u16, ScanError> {
    let s = s.trim();
    let port = s
        .parse::<u16>()
        .map_err(|e| ScanError::port(format!("'{s}' is not a valid port: {e}")))?;
    if port == 0 {
        return Err(ScanError::port("port 0 is out of range 1-65535"));
    }
    Ok(port)
}

/// Ports in order of first appearance, each at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u16>,
}

impl PortSet {
    /// Expands every entry, failing on the first malformed one.
    ///
    /// Entries may themselves be comma-joined lists.
    pub fn expand<I, S>(specs: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<u16> = HashSet::new();
        let mut ports: Vec<u16> = Vec::new();

        for entry in specs {
            for token in entry.as_ref().split(',') {
                if token.trim().is_empty() {
                    continue;
                }
                let spec: PortSpec = token.parse()?;
                ports.extend(spec.ports().filter(|port| seen.insert(*port)));
            }
        }

        if ports.is_empty() {
            return Err(ScanError::port("no ports specified"));
        }

        Ok(Self { ports })
    }

    pub fn well_known() -> Self {
        Self {
            ports: WELL_KNOWN_PORTS.to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl Default for PortSet {
    fn default() -> Self {
        Self::well_known()
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
