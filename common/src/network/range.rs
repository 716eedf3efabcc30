//! # IPv4 Range Model
//!
//! Start/end pairs and CIDR blocks both end up here as an [`Ipv4Range`].
//!
//! Enumeration walks the four octets as nested ranges. A lower octet starts
//! at its start value only while its parent octet sits on the parent's start
//! value, and stops at its end value only while the parent sits on the
//! parent's end value; otherwise it spans `0..=255`. For ranges produced from
//! a CIDR block, or any start/end pair inside one `/16`, this is the plain
//! numeric interval.

use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;

/// Inclusive, per-octet bounded range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let s: [u8; 4] = self.start_addr.octets();
        let e: [u8; 4] = self.end_addr.octets();

        (s[0]..=e[0]).flat_map(move |a| {
            octet_bounds(a, s[0], e[0], s[1], e[1]).flat_map(move |b| {
                octet_bounds(b, s[1], e[1], s[2], e[2]).flat_map(move |c| {
                    octet_bounds(c, s[2], e[2], s[3], e[3]).map(move |d| Ipv4Addr::new(a, b, c, d))
                })
            })
        })
    }

    pub fn to_vec(&self) -> Vec<Ipv4Addr> {
        self.iter().collect()
    }
}

fn octet_bounds(parent: u8, parent_start: u8, parent_end: u8, start: u8, end: u8) -> RangeInclusive<u8> {
    let lo: u8 = if parent == parent_start { start } else { 0 };
    let hi: u8 = if parent == parent_end { end } else { u8::MAX };
    lo..=hi
}

/// A network given as base octets plus prefix length, e.g. `192.168.1.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    pub octets: [u8; 4],
    pub prefix: u8,
}

impl CidrBlock {
    /// Only `/1` through `/31` are scannable blocks.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        if prefix == 0 || prefix >= 32 {
            return Err(ScanError::address(format!(
                "CIDR prefix /{prefix} is not supported, expected 1-31"
            )));
        }
        Ok(Self {
            octets: addr.octets(),
            prefix,
        })
    }

    /// Network address (host bits cleared) to all-host-bits-set address.
    pub fn to_range(&self) -> Ipv4Range {
        let mut start: [u8; 4] = self.octets;
        let mut end: [u8; 4] = self.octets;
        let boundary: usize = (self.prefix / 8) as usize;
        let masked_bits: u8 = self.prefix % 8;

        for idx in boundary..4 {
            if idx == boundary && masked_bits != 0 {
                let mask: u8 = u8::MAX << (8 - masked_bits);
                start[idx] &= mask;
                end[idx] = start[idx] | !mask;
            } else {
                start[idx] = 0;
                end[idx] = u8::MAX;
            }
        }

        Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end))
    }
}

impl FromStr for CidrBlock {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((ip_str, prefix_str)) = s.trim().split_once('/') else {
            return Err(ScanError::address(format!("'{s}' is not in CIDR notation")));
        };

        let addr = ip_str
            .parse::<Ipv4Addr>()
            .map_err(|e| ScanError::address(format!("invalid IP in CIDR '{ip_str}': {e}")))?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| ScanError::address(format!("invalid prefix in CIDR '{prefix_str}': {e}")))?;

        CidrBlock::new(addr, prefix)
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
