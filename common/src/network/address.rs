//! # Address Specification
//!
//! Defines how the set of hosts to scan is described and expanded.
//!
//! A specification is one of:
//! * An explicit list of addresses, one per line (usually read from a file).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A start/end pair of full addresses (e.g., `192.168.1.1`, `192.168.1.50`).
//!
//! The single-argument target syntax also accepts an abbreviated range end
//! (`192.168.1.1-50`); it is widened to a full address while parsing.
//!
//! When more than one is supplied, the list wins over the CIDR block, which
//! wins over the start/end pair.

use std::net::Ipv4Addr;
use std::str::FromStr;

use tracing::debug;

use crate::error::ScanError;
use crate::network::range::{CidrBlock, Ipv4Range};

/// Describes which hosts to scan. Parsing of the individual parts is deferred
/// to [`AddressSpec::expand`] so every validation error surfaces in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSpec {
    /// Explicit addresses; blank lines are ignored.
    List(Vec<String>),
    /// CIDR notation, `a.b.c.d/prefix`.
    Cidr(String),
    /// Start and end address, both in full dotted-quad form.
    Range { start: String, end: String },
}

impl AddressSpec {
    /// Picks the mode with the highest priority among those supplied.
    ///
    /// A start without an end scans the start address alone.
    pub fn select(
        list: Option<Vec<String>>,
        cidr: Option<String>,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<Self, ScanError> {
        if let Some(lines) = list {
            return Ok(AddressSpec::List(lines));
        }
        if let Some(cidr) = cidr {
            return Ok(AddressSpec::Cidr(cidr));
        }
        match (start, end) {
            (Some(start), Some(end)) => Ok(AddressSpec::Range { start, end }),
            (Some(start), None) => Ok(AddressSpec::Range {
                end: start.clone(),
                start,
            }),
            (None, Some(end)) => Err(ScanError::address(format!(
                "end address '{end}' given without a start address"
            ))),
            (None, None) => Err(ScanError::address("no hosts to scan were specified")),
        }
    }

    /// Reads an address list from the lines of `text`.
    pub fn from_lines(text: &str) -> Self {
        AddressSpec::List(text.lines().map(str::to_string).collect())
    }

    /// Materializes the full, ordered host sequence.
    pub fn expand(&self) -> Result<Vec<Ipv4Addr>, ScanError> {
        let addrs: Vec<Ipv4Addr> = match self {
            AddressSpec::List(lines) => parse_list(lines)?,
            AddressSpec::Cidr(cidr) => cidr.parse::<CidrBlock>()?.to_range().to_vec(),
            AddressSpec::Range { start, end } => parse_range(start, end)?.to_vec(),
        };
        debug!("address specification expanded to {} host(s)", addrs.len());
        Ok(addrs)
    }
}

impl FromStr for AddressSpec {
    type Err = ScanError;

    /// Parses a single target expression.
    ///
    /// Supported formats:
    /// * **Host**: `192.168.1.5`
    /// * **Range**: `192.168.1.1-50`, `192.168.1.1-192.168.1.50`
    /// * **CIDR**: `192.168.1.0/24`
    /// * **List**: `10.0.0.1,10.0.0.7`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return Ok(AddressSpec::List(
                s.split(',').map(|part| part.trim().to_string()).collect(),
            ));
        }
        if s.contains('/') {
            return Ok(AddressSpec::Cidr(s.to_string()));
        }
        if let Some((start, end)) = s.split_once('-') {
            let start = start.trim();
            let start_addr = start
                .parse::<Ipv4Addr>()
                .map_err(|e| ScanError::address(format!("invalid start IP '{start}': {e}")))?;
            let end_addr = widen_range_end(end.trim(), &start_addr)?;
            return Ok(AddressSpec::Range {
                start: start.to_string(),
                end: end_addr.to_string(),
            });
        }
        if s.parse::<Ipv4Addr>().is_ok() {
            return Ok(AddressSpec::Range {
                start: s.to_string(),
                end: s.to_string(),
            });
        }

        Err(ScanError::address(format!("invalid target: {s}")))
    }
}

fn parse_list(lines: &[String]) -> Result<Vec<Ipv4Addr>, ScanError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.parse::<Ipv4Addr>()
                .map_err(|e| ScanError::address(format!("line {line_no}: '{line}': {e}")))
        })
        .collect()
}

fn parse_range(start_str: &str, end_str: &str) -> Result<Ipv4Range, ScanError> {
    let start_addr = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| ScanError::address(format!("invalid start IP '{start_str}': {e}")))?;
    let end_addr = end_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| ScanError::address(format!("invalid end IP '{end_str}': {e}")))?;

    Ok(Ipv4Range::new(start_addr, end_addr))
}

/// Completes an abbreviated range end like "50" or "2.66" from the leading
/// octets of the start address. Full addresses pass through unchanged.
fn widen_range_end(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, ScanError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(ScanError::address("end address cannot be empty"));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| ScanError::address(format!("invalid end address '{end_str}': {e}")))?;

    if partial_octets.len() > 4 {
        return Err(ScanError::address(format!(
            "end address has too many octets: {end_str}"
        )));
    }

    let mut end_octets: [u8; 4] = start_addr.octets();
    let start_index: usize = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
