//! Wireless network discovery through the system tools.
//!
//! Both `nmcli` and `iwlist` are asked for the networks in range and their answers
//! are merged. A missing or failing tool is not an error: it is logged and
//! contributes nothing.

use std::collections::BTreeSet;
use std::process::Command;

use anyhow::{Context, bail};
use tracing::{debug, warn};

mod store;

pub use store::{load_names, save_names};

/// Names of the wireless networks in range, de-duplicated and sorted.
pub fn list_available_networks() -> Vec<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();

    match run_tool("nmcli", &["-t", "-f", "SSID", "dev", "wifi"]) {
        Ok(output) => names.extend(parse_nmcli_ssids(&output)),
        Err(e) => warn!("nmcli scan failed: {e:#}"),
    }
    match run_tool("iwlist", &["scan"]) {
        Ok(output) => names.extend(parse_iwlist_essids(&output)),
        Err(e) => warn!("iwlist scan failed: {e:#}"),
    }

    debug!("{} wireless networks in range", names.len());
    names.into_iter().collect()
}

/// One radio announcing a network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessPoint {
    pub ssid: String,
    pub bssid: String,
}

/// Access points `nmcli` can see, sorted by network name.
pub fn list_access_points() -> Vec<AccessPoint> {
    match run_tool("nmcli", &["-t", "-f", "SSID,BSSID", "dev", "wifi"]) {
        Ok(output) => {
            let mut points: Vec<AccessPoint> = parse_nmcli_access_points(&output);
            points.sort();
            points.dedup();
            points
        }
        Err(e) => {
            warn!("nmcli access point scan failed: {e:#}");
            Vec::new()
        }
    }
}

/// The network this machine is currently associated with, if any.
pub fn active_network_name() -> Option<String> {
    match run_tool("nmcli", &["-t", "-f", "active,ssid", "dev", "wifi"]) {
        Ok(output) => parse_active_ssid(&output),
        Err(e) => {
            warn!("could not query the active network: {e:#}");
            None
        }
    }
}

fn run_tool(program: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute {program}"))?;

    if !output.status.success() {
        bail!("{program} exited with {}", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// One SSID per line in terse mode. Hidden networks show up as blank lines.
pub fn parse_nmcli_ssids(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| unescape_terse(line.trim()))
        .filter(|ssid| !ssid.is_empty())
        .collect()
}

/// `SSID:BSSID` rows of `nmcli -t -f SSID,BSSID`. Rows missing either half are dropped.
pub fn parse_nmcli_access_points(output: &str) -> Vec<AccessPoint> {
    output
        .lines()
        .filter_map(|line| {
            let (ssid, bssid) = split_terse(line.trim())?;
            let ssid: String = unescape_terse(ssid);
            let bssid: String = unescape_terse(bssid);
            if ssid.is_empty() || bssid.is_empty() {
                return None;
            }
            Some(AccessPoint { ssid, bssid })
        })
        .collect()
}

/// Picks the quoted value out of every `ESSID:"..."` line.
pub fn parse_iwlist_essids(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ESSID:"))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|ssid| !ssid.is_empty())
        .collect()
}

/// Finds the `yes:<ssid>` row of `nmcli -t -f active,ssid`.
pub fn parse_active_ssid(output: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("yes:"))
        .map(unescape_terse)
        .find(|ssid| !ssid.is_empty())
}

/// Splits a terse row at its first unescaped `:`.
fn split_terse(line: &str) -> Option<(&str, &str)> {
    let mut escaped: bool = false;
    for (idx, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ':' if !escaped => return Some((&line[..idx], &line[idx + 1..])),
            _ => escaped = false,
        }
    }
    None
}

/// Terse nmcli output escapes field separators as `\:`.
fn unescape_terse(field: &str) -> String {
    field.replace("\\:", ":")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
