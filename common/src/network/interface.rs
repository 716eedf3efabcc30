//! Chooses the interface an ARP request for a given address leaves on.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use tracing::trace;

use crate::utils::interface::NetworkInterfaceExtension;

/// Why an interface cannot carry ARP.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Unusable {
    Down,
    Loopback,
    NoMacAddress,
    /// ARP requests are broadcast.
    NoBroadcast,
    /// Tunnels and VPN links have no link-layer neighbours.
    PointToPoint,
    NoIpv4,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum LinkKind {
    Wired,
    Wireless,
    /// Bridges, veths and anything else without backing hardware.
    Virtual,
}

pub fn arp_capable(intf: &NetworkInterface) -> Result<(), Unusable> {
    match intf {
        i if !i.is_up() => Err(Unusable::Down),
        i if i.is_loopback() => Err(Unusable::Loopback),
        i if i.mac.is_none() => Err(Unusable::NoMacAddress),
        i if !i.is_broadcast() => Err(Unusable::NoBroadcast),
        i if i.is_point_to_point() => Err(Unusable::PointToPoint),
        i if i.get_ipv4_nets().is_empty() => Err(Unusable::NoIpv4),
        _ => Ok(()),
    }
}

/// Interface for reaching `target`: the one whose subnet contains it, else
/// the one owning the kernel's route source address, else the best LAN
/// interface (wired before wireless, virtual links never).
pub fn interface_for(target: Ipv4Addr) -> Option<NetworkInterface> {
    let candidates: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|intf| arp_capable(intf).is_ok())
        .collect();

    choose(candidates, target, route_source(target), link_kind)
}

fn choose(
    candidates: Vec<NetworkInterface>,
    target: Ipv4Addr,
    route_source: Option<Ipv4Addr>,
    kind_of: impl Fn(&NetworkInterface) -> LinkKind,
) -> Option<NetworkInterface> {
    if let Some(intf) = candidates.iter().find(|i| i.owns_subnet_of(target)) {
        trace!("{target} is on-link via {}", intf.name);
        return Some(intf.clone());
    }

    let routed = route_source.and_then(|src| candidates.iter().find(|i| i.has_ipv4(src)));
    if let Some(intf) = routed {
        trace!("{target} is routed via {}", intf.name);
        return Some(intf.clone());
    }

    candidates
        .into_iter()
        .map(|intf| (kind_of(&intf), intf))
        .filter(|(kind, _)| *kind != LinkKind::Virtual)
        .min_by_key(|(kind, _)| *kind)
        .map(|(_, intf)| intf)
}

/// Local address the kernel would use towards `target`. Connecting a UDP
/// socket only performs the route lookup; nothing is sent.
fn route_source(target: Ipv4Addr) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((target, 9)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(src) => Some(src),
        IpAddr::V6(_) => None,
    }
}

#[cfg(target_os = "linux")]
fn link_kind(intf: &NetworkInterface) -> LinkKind {
    let sysfs = std::path::Path::new("/sys/class/net").join(&intf.name);
    if !sysfs.join("device").exists() {
        LinkKind::Virtual
    } else if sysfs.join("wireless").exists() || sysfs.join("phy80211").exists() {
        LinkKind::Wireless
    } else {
        LinkKind::Wired
    }
}

#[cfg(not(target_os = "linux"))]
fn link_kind(intf: &NetworkInterface) -> LinkKind {
    kind_from_name(&intf.name)
}

/// Best guess from conventional interface names.
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn kind_from_name(name: &str) -> LinkKind {
    const VIRTUAL: [&str; 7] = ["br", "veth", "docker", "vmnet", "utun", "awdl", "llw"];
    const WIRELESS: [&str; 2] = ["wl", "ath"];

    if VIRTUAL.iter().any(|prefix| name.starts_with(prefix)) {
        LinkKind::Virtual
    } else if WIRELESS.iter().any(|prefix| name.starts_with(prefix)) {
        LinkKind::Wireless
    } else {
        LinkKind::Wired
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
