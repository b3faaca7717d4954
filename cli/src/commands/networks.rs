use std::path::Path;
use std::process::ExitCode;

use colored::*;
use sweepr_common::{success, warn};
use sweepr_core::wireless::{self, AccessPoint};

use crate::commands::NetworksArgs;
use crate::terminal::format::Detail;
use crate::terminal::{colors, print};

/// What one pass over the wireless tools turned up.
#[derive(Debug, Default)]
pub struct NetworkScan {
    /// Saved network names, as read back from the file.
    pub names: Vec<String>,
    pub active: Option<String>,
    pub access_points: Vec<AccessPoint>,
}

pub fn networks(args: &NetworksArgs) -> anyhow::Result<ExitCode> {
    let scan: NetworkScan = scan(&args.file)?;
    if scan.names.is_empty() {
        print::nothing_found("wireless networks");
        return Ok(ExitCode::SUCCESS);
    }

    print_networks(&scan);
    Ok(ExitCode::SUCCESS)
}

/// Scans for networks, saves them to `file` and reads the saved list back.
///
/// Runs the external tools to completion, so async callers go through
/// `spawn_blocking`.
pub fn scan(file: &Path) -> anyhow::Result<NetworkScan> {
    let found: Vec<String> = wireless::list_available_networks();
    if found.is_empty() {
        warn!("No wireless networks in range");
    }

    wireless::save_names(file, &found)?;
    let names: Vec<String> = wireless::load_names(file);
    success!(
        "{} networks saved to {}",
        names.len().to_string().bold(),
        file.display().to_string().color(colors::ACCENT)
    );

    if names.is_empty() {
        return Ok(NetworkScan::default());
    }

    Ok(NetworkScan {
        names,
        active: wireless::active_network_name(),
        access_points: wireless::list_access_points(),
    })
}

pub fn print_networks(scan: &NetworkScan) {
    for (idx, name) in scan.names.iter().enumerate() {
        let head: String = if Some(name.as_str()) == scan.active.as_deref() {
            format!("{name} {}", "(connected)".dimmed())
        } else {
            name.clone()
        };
        print::tree(idx + 1, &head, &bssid_details(name, &scan.access_points));
    }
}

fn bssid_details(name: &str, access_points: &[AccessPoint]) -> Vec<Detail> {
    access_points
        .iter()
        .filter(|point| point.ssid == name)
        .map(|point| ("BSSID".to_string(), point.bssid.color(colors::MAC_ADDR)))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
