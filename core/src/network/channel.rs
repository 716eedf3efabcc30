//! Layer 2 access for ARP resolution.
//!
//! Opening an Ethernet channel needs raw socket privileges; callers treat a
//! failure here as "could not resolve" rather than as a fatal error.

use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;
use tracing::trace;

use sweepr_protocols::{arp, ethernet};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: Box<dyn DataLinkReceiver>,
}

pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    open_eth_channel(intf, &get_config(), datalink::channel)
}

/// Sends one ARP request for `target` and waits up to `wait` for its reply.
pub fn resolve_mac(
    handle: &mut EthernetHandle,
    src_mac: MacAddr,
    target: Ipv4Addr,
    wait: Duration,
) -> anyhow::Result<MacAddr> {
    let request: Vec<u8> = arp::create_request(src_mac, target)?;
    match handle.tx.send_to(&request, None) {
        Some(result) => result.context("sending ARP request")?,
        None => bail!("ARP request for {target} was not sent"),
    }

    let deadline: Instant = Instant::now() + wait;
    while Instant::now() < deadline {
        match handle.rx.next() {
            Ok(bytes) => {
                let Ok(frame) = ethernet::get_packet_from_u8(bytes) else {
                    continue;
                };
                if let Some(mac) = arp::reply_from(&frame, target) {
                    return Ok(mac);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) => return Err(e).context("reading from Ethernet channel"),
        }
    }

    trace!("no ARP reply from {target} within {wait:?}");
    bail!("no ARP reply from {target}")
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> anyhow::Result<EthernetHandle>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<Channel>,
{
    let ch: Channel =
        channel_opener(intf, *cfg).with_context(|| format!("opening on {}", intf.name))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok(EthernetHandle { tx, rx }),
        _ => bail!("non-ethernet channel for {}", intf.name),
    }
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
    use pnet::datalink::dummy;
    use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, MutableArpPacket};
    use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
    use sweepr_protocols::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS};

    const LOCAL_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);
    const PEER_MAC: MacAddr = MacAddr(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01);

    fn arp_reply(sender_ip: Ipv4Addr, sender_mac: MacAddr) -> Box<[u8]> {
        let mut buffer = vec![0u8; MIN_ETH_FRAME_NO_FCS];
        {
            let mut eth = MutableEthernetPacket::new(&mut buffer).unwrap();
            eth.set_destination(LOCAL_MAC);
            eth.set_source(sender_mac);
            eth.set_ethertype(EtherTypes::Arp);
        }
        {
            let mut arp =
                MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN]).unwrap();
            arp.set_hardware_type(ArpHardwareTypes::Ethernet);
            arp.set_protocol_type(EtherTypes::Ipv4);
            arp.set_hw_addr_len(6);
            arp.set_proto_addr_len(4);
            arp.set_operation(ArpOperations::Reply);
            arp.set_sender_hw_addr(sender_mac);
            arp.set_sender_proto_addr(sender_ip);
            arp.set_target_hw_addr(LOCAL_MAC);
            arp.set_target_proto_addr(Ipv4Addr::UNSPECIFIED);
        }
        buffer.into_boxed_slice()
    }

    #[test]
    fn open_eth_channel_should_succeed_on_ethernet_channel() {
        let dummy_intf: NetworkInterface = dummy::dummy_interface(0);
        let mock_opener_success =
            |i: &NetworkInterface, _cfg: Config| -> std::io::Result<datalink::Channel> {
                dummy::channel(i, dummy::Config::default())
            };
        let result = open_eth_channel(&dummy_intf, &Config::default(), mock_opener_success);
        assert!(result.is_ok());
    }

    #[test]
    fn open_eth_channel_should_fail_on_io_error() {
        let dummy_intf: NetworkInterface = dummy::dummy_interface(0);
        let mock_opener_fail =
            |_: &NetworkInterface, _: Config| -> std::io::Result<datalink::Channel> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "Mock I/O Error",
                ))
            };

        let Err(e) = open_eth_channel(&dummy_intf, &Config::default(), mock_opener_fail) else {
            panic!("expected opening to fail");
        };
        assert!(e.to_string().contains("opening on eth0"));
        let cause = e.downcast_ref::<std::io::Error>().expect("io error cause");
        assert_eq!(cause.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn resolve_mac_waits_for_matching_reply() {
        let target = Ipv4Addr::new(192, 168, 1, 77);
        let mut dummy_cfg = dummy::Config::default();
        let inject = dummy_cfg.inject_handle().expect("inject handle");
        let sent = dummy_cfg.read_handle().expect("read handle");

        let dummy_intf = dummy::dummy_interface(0);
        let mut handle = open_eth_channel(&dummy_intf, &Config::default(), |i, _| {
            dummy::channel(i, dummy_cfg)
        })
        .unwrap();

        inject
            .send(Ok(arp_reply(Ipv4Addr::new(192, 168, 1, 5), MacAddr::broadcast())))
            .unwrap();
        inject.send(Ok(arp_reply(target, PEER_MAC))).unwrap();

        let mac = resolve_mac(&mut handle, LOCAL_MAC, target, Duration::from_secs(2)).unwrap();
        assert_eq!(mac, PEER_MAC);

        let request = sent.try_recv().expect("an ARP request was sent");
        let frame = ethernet::get_packet_from_u8(&request).unwrap();
        assert_eq!(frame.get_ethertype(), EtherTypes::Arp);
        assert_eq!(frame.get_source(), LOCAL_MAC);
    }

    #[test]
    #[ignore = "needs raw socket privileges and a LAN peer"]
    fn resolve_mac_on_real_interface() {
        let gateway = Ipv4Addr::new(192, 168, 1, 1);
        let intf = sweepr_common::network::interface::interface_for(gateway).unwrap();
        let mut handle = start_capture(&intf).unwrap();
        let mac = resolve_mac(&mut handle, intf.mac.unwrap(), gateway, Duration::from_secs(1));
        assert!(mac.is_ok());
    }
}
