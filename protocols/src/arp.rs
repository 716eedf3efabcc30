use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::util::MacAddr;

use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, ethernet};

/// Broadcast who-has request for `dst_addr`.
///
/// The sender protocol address is left at `0.0.0.0`, so the request does not
/// depend on which address the outgoing interface carries and does not
/// update anyone's neighbour cache.
pub fn create_request(src_mac: MacAddr, dst_addr: Ipv4Addr) -> anyhow::Result<Vec<u8>> {
    create_packet(src_mac, MacAddr::zero(), Ipv4Addr::UNSPECIFIED, dst_addr)
}

pub fn create_packet(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, src_mac, MacAddr::broadcast(), EtherTypes::Arp)?;

    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .context("failed to create mutable ARP packet")?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Request);
    arp_packet.set_sender_hw_addr(src_mac);
    arp_packet.set_target_hw_addr(dst_mac);
    arp_packet.set_sender_proto_addr(src_addr);
    arp_packet.set_target_proto_addr(dst_addr);

    Ok(Vec::from(buffer))
}

/// Returns the hardware address announced by `target` if `frame` is its ARP
/// reply. Anything else on the wire yields `None`.
pub fn reply_from(frame: &EthernetPacket, target: Ipv4Addr) -> Option<MacAddr> {
    if frame.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp_packet = ArpPacket::new(frame.payload())?;
    let is_answer: bool = arp_packet.get_operation() == ArpOperations::Reply
        && arp_packet.get_sender_proto_addr() == target;

    is_answer.then(|| arp_packet.get_sender_hw_addr())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
