use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use colored::*;
use tracing::{Instrument, info_span};

use crate::commands::networks::{self, NetworkScan};
use crate::commands::{DiscoverArgs, Target};
use crate::mprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::input::{self, InputHandle};
use crate::terminal::{colors, print, spinner};
use sweepr_common::config::{Config, SweepConfig};
use sweepr_common::network::host::{ResolvedHost, ScanReport};
use sweepr_common::network::interface;
use sweepr_common::network::subnet::{self, NetworkDescriptor};
use sweepr_common::{info, success, warn};
use sweepr_core::discovery::DiscoveryService;
use sweepr_core::sweep::StopSignal;

/// Conventional exit status of a process stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

pub async fn discover(args: &DiscoverArgs, cfg: &Config) -> anyhow::Result<ExitCode> {
    let descriptor: NetworkDescriptor = match args.target {
        Some(Target::Subnet(net)) => net,
        Some(Target::Lan) => local_subnet()
            .ok_or_else(|| anyhow!("no usable IPv4 interface to take the subnet from"))?,
        None if cfg.disable_input => {
            return Err(anyhow!("a target is required when input is disabled"));
        }
        None => choose_subnet(args).await?,
    };

    let sweep_cfg: SweepConfig = args.sweep_config();
    print::field("Subnet", format::subnet_to_string(&descriptor));
    print::field("Hosts", descriptor.host_count());
    print::field("Concurrency", sweep_cfg.concurrency);

    let start_time: Instant = Instant::now();
    let report: ScanReport = run_sweep(&descriptor, sweep_cfg, cfg).await?;

    discovery_ends(&report, start_time.elapsed(), cfg);

    if report.interrupted() {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_sweep(
    descriptor: &NetworkDescriptor,
    sweep_cfg: SweepConfig,
    cfg: &Config,
) -> anyhow::Result<ScanReport> {
    let span = info_span!("discovery", indicatif.pb_show = true);
    spinner::attach_progress(&span, descriptor.host_count(), !cfg.disable_input)?;

    let service = DiscoveryService::system(sweep_cfg)
        .with_progress(spinner::discovery_progress(span.clone()));

    let stop = StopSignal::new();
    let report = if cfg.disable_input {
        let listener = input::spawn_ctrl_c(stop.clone());
        let report = service.sweep(descriptor, &stop).instrument(span).await;
        listener.abort();
        report
    } else {
        let _input = InputHandle::start(stop.clone());
        service.sweep(descriptor, &stop).instrument(span).await
    };

    Ok(report?)
}

/// Interactive selection: pick a wireless network, then work out what to sweep.
async fn choose_subnet(args: &DiscoverArgs) -> anyhow::Result<NetworkDescriptor> {
    let scan: NetworkScan = scan_networks(args.file.clone()).await?;
    if scan.names.is_empty() {
        return prompt_subnet();
    }

    networks::print_networks(&scan);

    let idx: usize = input::choose("Network to sweep:", &scan.names)?;
    let chosen: &str = scan.names[idx].as_str();
    if scan.active.as_deref() != Some(chosen) {
        info!("Not connected to {chosen}, enter its subnet by hand");
        return prompt_subnet();
    }

    match local_subnet() {
        Some(net) => {
            success!("Detected subnet {}", format::subnet_to_string(&net));
            Ok(net)
        }
        None => {
            warn!("Could not detect the local subnet");
            prompt_subnet()
        }
    }
}

/// The wireless tools block until their scan ends; keep them off the runtime threads.
async fn scan_networks(file: PathBuf) -> anyhow::Result<NetworkScan> {
    tokio::task::spawn_blocking(move || networks::scan(&file)).await?
}

fn prompt_subnet() -> anyhow::Result<NetworkDescriptor> {
    let answer: String = input::prompt("Subnet (e.g. 192.168.1.0/24):")?;
    Ok(answer.parse::<NetworkDescriptor>()?)
}

fn local_subnet() -> Option<NetworkDescriptor> {
    let (addr, prefix) = interface::local_address_and_prefix()?;
    match subnet::compute_subnet(&addr.to_string(), i64::from(prefix)) {
        Ok(net) => Some(net),
        Err(e) => {
            warn!("Local interface reported an unusable network: {e}");
            None
        }
    }
}

fn discovery_ends(report: &ScanReport, total_time: Duration, cfg: &Config) {
    if report.interrupted() {
        warn!(
            "Sweep interrupted after {} of {} addresses",
            report.probed(),
            report.network().host_count()
        );
    }

    if report.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    print_hosts(report.hosts(), cfg);
    print_summary(report.len(), total_time, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::header("ZERO HOSTS DETECTED", cfg.quiet);
    print::nothing_found("hosts");
}

fn print_hosts(hosts: &[ResolvedHost], cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        match cfg.quiet {
            0 | 1 => {
                print_host_tree(host, idx);
                if idx + 1 != hosts.len() {
                    mprint!();
                }
            }
            _ => print::print(&host.address.to_string()),
        }
    }
}

fn print_summary(hosts_len: usize, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{hosts_len} active hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Discovery Complete: {active_hosts} identified in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::separator();
            print::centered(output);
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}

fn print_host_tree(host: &ResolvedHost, idx: usize) {
    let mut details: Vec<Detail> = vec![
        format::ip_to_detail(host.address),
        format::mac_to_detail(host.hardware_address),
    ];

    if let Some(vendor_detail) = format::vendor_to_detail(host.hardware_address) {
        details.push(vendor_detail);
    }

    print::tree(idx, &host.address.to_string(), &details);
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
