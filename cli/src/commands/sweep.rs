use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{debug, warn};

use sweepr_common::config::ScanConfig;
use sweepr_common::network::address::AddressSpec;
use sweepr_common::network::host::HostReport;
use sweepr_common::network::ports::PortSet;
use sweepr_common::network::target::Protocol;
use sweepr_core::scheduler::ScanScheduler;

use crate::commands::CommandLine;
use crate::sprint;
use crate::terminal::{colors, print, spinner::ScanProgress};

type Detail = (String, ColoredString);

pub async fn sweep(cli: &CommandLine) -> anyhow::Result<()> {
    let spec: AddressSpec = address_spec(cli)?;
    let hosts = spec.expand().context("invalid host specification")?;
    let ports: PortSet = port_set(&cli.ports).context("invalid port specification")?;
    let cfg = ScanConfig::default().with_concurrency(cli.max_hosts, cli.max_per_host);
    cfg.validate()?;

    if cli.protocol == Protocol::Arp && !is_root::is_root() {
        warn!("ARP needs raw socket access; without root every host will look silent");
    }

    print::header("sweep", cli.quiet);
    if cli.quiet == 0 {
        print::aligned_line("Protocol", cli.protocol.as_str().to_uppercase().bold());
        print::aligned_line("Hosts", hosts.len().to_string().color(colors::ACCENT));
        if cli.protocol.uses_ports() {
            print::aligned_line("Ports", ports.len().to_string().color(colors::ACCENT));
        }
        print::aligned_line(
            "Workers",
            format!("{} x {}", cfg.max_host_concurrency, cfg.max_per_host_concurrency).normal(),
        );
    }

    let progress = ScanProgress::start(hosts.len());
    let scheduler = ScanScheduler::for_protocol(cli.protocol, &cfg).on_host_done(progress.tracker());

    let start_time: Instant = Instant::now();
    let mut rx = scheduler.run(hosts, &ports, cli.protocol);
    let mut reports: Vec<HostReport> = Vec::new();
    while let Some(report) = rx.recv().await {
        reports.push(report);
    }
    progress.finish();

    reports.sort_by_key(|report| report.addr);
    sweep_ends(&reports, cli.protocol, start_time.elapsed(), cli.quiet);
    Ok(())
}

/// Explicit address flags take priority over the positional target.
fn address_spec(cli: &CommandLine) -> anyhow::Result<AddressSpec> {
    if let Some(path) = &cli.input {
        return load_host_file(path);
    }
    if !cli.has_address_flags() {
        if let Some(target) = &cli.target {
            return Ok(target.clone());
        }
    } else if cli.target.is_some() {
        debug!("positional target ignored in favour of address flags");
    }

    Ok(AddressSpec::select(
        None,
        cli.cidr.clone(),
        cli.start.clone(),
        cli.end.clone(),
    )?)
}

fn load_host_file(path: &Path) -> anyhow::Result<AddressSpec> {
    let text: String = fs::read_to_string(path)
        .with_context(|| format!("reading host list {}", path.display()))?;
    Ok(AddressSpec::from_lines(&text))
}

fn port_set(specs: &[String]) -> anyhow::Result<PortSet> {
    if specs.is_empty() {
        return Ok(PortSet::well_known());
    }
    Ok(PortSet::expand(specs)?)
}

fn sweep_ends(reports: &[HostReport], protocol: Protocol, total_time: Duration, quiet: u8) {
    if reports.is_empty() {
        no_hosts_found(quiet);
        return;
    }

    if quiet > 0 {
        sprint!();
    }

    print::header("Responsive Hosts", quiet);
    print_hosts(reports, protocol, quiet);
    print_summary(reports.len(), total_time, quiet);
}

fn no_hosts_found(quiet: u8) {
    print::header("nothing responded", quiet);
    if quiet < 2 {
        print::no_results();
    }
}

fn print_hosts(reports: &[HostReport], protocol: Protocol, quiet: u8) {
    for (idx, report) in reports.iter().enumerate() {
        match quiet {
            2.. => print_host_line(report, protocol),
            _ => {
                print_host_tree(report, protocol, idx);
                if idx + 1 != reports.len() {
                    sprint!();
                }
            }
        }
    }
}

fn print_host_tree(report: &HostReport, protocol: Protocol, idx: usize) {
    print::tree_head(idx, &report.addr.to_string());
    print::as_tree_one_level(&host_details(report, protocol));
}

fn print_host_line(report: &HostReport, protocol: Protocol) {
    let summary: String = report.summary(protocol).unwrap_or_default();
    print::print(&format!("{} {}", report.addr, summary));
}

fn host_details(report: &HostReport, protocol: Protocol) -> Vec<Detail> {
    match protocol {
        Protocol::Arp => report
            .mac()
            .map(|mac| vec![("MAC".to_string(), mac.color(colors::MAC_ADDR))])
            .unwrap_or_default(),
        Protocol::Tcp | Protocol::Udp => {
            let ports: Vec<u16> = report.open_ports(protocol);
            let joined: String = ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<String>>()
                .join(", ");
            vec![
                ("Open".to_string(), ports.len().to_string().color(colors::ACCENT)),
                (
                    protocol.as_str().to_uppercase(),
                    joined.color(colors::PORT),
                ),
            ]
        }
    }
}

fn print_summary(hosts_len: usize, total_time: Duration, quiet: u8) {
    let active_hosts: ColoredString = format!("{hosts_len} responsive hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Sweep Complete: {active_hosts} found in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        1 => {
            sprint!();
            print::print(&output);
        }
        _ => {}
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
