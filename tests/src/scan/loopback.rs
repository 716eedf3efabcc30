use std::net::Ipv4Addr;
use std::time::Duration;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::ports::PortSet;
use sweepr_common::network::target::Protocol;
use tokio::net::{TcpListener, UdpSocket};

fn fast_config() -> ScanConfig {
    ScanConfig {
        tcp_timeout: Duration::from_millis(300),
        udp_timeout: Duration::from_millis(300),
        icmp_timeout: Duration::from_millis(300),
        ..ScanConfig::default()
    }
}

async fn closed_tcp_port(addr: Ipv4Addr) -> u16 {
    let listener = TcpListener::bind((addr, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn tcp_sweep_of_localhost_finds_listeners() -> anyhow::Result<()> {
    let first = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let second = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let open_a = first.local_addr()?.port();
    let open_b = second.local_addr()?.port();
    let closed = closed_tcp_port(Ipv4Addr::LOCALHOST).await;

    let ports = PortSet::expand([open_b, closed, open_a].map(|port| port.to_string()))?;
    let reports = sweepr_core::scan(
        vec![Ipv4Addr::LOCALHOST],
        &ports,
        Protocol::Tcp,
        &fast_config(),
    )
    .await;

    let mut expected = vec![open_a, open_b];
    expected.sort_unstable();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].addr, Ipv4Addr::LOCALHOST);
    assert_eq!(reports[0].open_ports(Protocol::Tcp), expected);
    Ok(())
}

#[tokio::test]
async fn udp_sweep_of_localhost_finds_echo_service() -> anyhow::Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let port = socket.local_addr()?.port();
    tokio::spawn(async move {
        let mut buffer = [0u8; 64];
        while let Ok((len, peer)) = socket.recv_from(&mut buffer).await {
            let _ = socket.send_to(&buffer[..len], peer).await;
        }
    });

    let ports = PortSet::expand([port.to_string()])?;
    let reports = sweepr_core::scan(
        vec![Ipv4Addr::LOCALHOST],
        &ports,
        Protocol::Udp,
        &fast_config(),
    )
    .await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].open_ports(Protocol::Udp), vec![port]);
    Ok(())
}

/// Every 127/8 address is local on Linux, which gives two distinct hosts.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn tcp_sweep_of_two_loopback_hosts() -> anyhow::Result<()> {
    let host_a = Ipv4Addr::new(127, 0, 0, 2);
    let host_b = Ipv4Addr::new(127, 0, 0, 3);

    let b_first = TcpListener::bind((host_b, 0)).await?;
    let shared = b_first.local_addr()?.port();
    let a_only = TcpListener::bind((host_a, shared)).await?;
    let b_second = TcpListener::bind((host_b, 0)).await?;
    let b_extra = b_second.local_addr()?.port();
    let _keep = (a_only, b_first, b_second);

    let ports = PortSet::expand([shared.to_string(), b_extra.to_string()])?;
    let reports = sweepr_core::scan(
        vec![host_b, host_a],
        &ports,
        Protocol::Tcp,
        &fast_config(),
    )
    .await;

    let mut b_ports = vec![shared, b_extra];
    b_ports.sort_unstable();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].addr, host_a);
    assert_eq!(reports[0].open_ports(Protocol::Tcp), vec![shared]);
    assert_eq!(reports[1].addr, host_b);
    assert_eq!(reports[1].open_ports(Protocol::Tcp), b_ports);
    Ok(())
}
