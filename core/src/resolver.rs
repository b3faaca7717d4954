//! Hardware address lookups against the local neighbour (ARP) table.
//!
//! The table is filled by the network stack as a side effect of traffic, the
//! sweep's own probes included. Nothing here sends packets or writes the table.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::process::Command;
use std::str::FromStr;
use std::sync::Arc;

use pnet::util::MacAddr;
use sweepr_common::network::host::ResolvedHost;
use tracing::debug;

const PROC_ARP_PATH: &str = "/proc/net/arp";
/// Flags value of an entry that never completed resolution.
const INCOMPLETE_FLAGS: &str = "0x0";

/// Read-only view of a table mapping IPv4 addresses to hardware addresses.
pub trait NeighborCache: Send + Sync {
    /// `None` when the table has no complete entry for `addr`.
    fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr>;

    /// Complete entries for `addrs`, gathered in one go.
    ///
    /// Sources that can read their whole table at once override this; the default
    /// falls back to one lookup per address.
    fn snapshot(&self, addrs: &[Ipv4Addr]) -> HashMap<Ipv4Addr, MacAddr> {
        addrs
            .iter()
            .filter_map(|addr| self.lookup(*addr).map(|mac| (*addr, mac)))
            .collect()
    }
}

/// Pairs reachable hosts with their hardware addresses.
#[derive(Clone)]
pub struct AddressResolver {
    cache: Arc<dyn NeighborCache>,
}

impl AddressResolver {
    pub fn new(cache: Arc<dyn NeighborCache>) -> Self {
        Self { cache }
    }

    pub fn resolve(&self, addr: Ipv4Addr) -> ResolvedHost {
        pair(addr, self.cache.lookup(addr))
    }

    /// Resolves every address against a single snapshot of the table.
    pub fn resolve_all(&self, addrs: impl IntoIterator<Item = Ipv4Addr>) -> Vec<ResolvedHost> {
        let addrs: Vec<Ipv4Addr> = addrs.into_iter().collect();
        let table: HashMap<Ipv4Addr, MacAddr> = self.cache.snapshot(&addrs);

        addrs
            .into_iter()
            .map(|addr| pair(addr, table.get(&addr).copied()))
            .collect()
    }
}

fn pair(addr: Ipv4Addr, mac: Option<MacAddr>) -> ResolvedHost {
    let host = ResolvedHost::new(addr);
    match mac {
        Some(mac) => host.with_mac(mac),
        None => {
            debug!("no neighbour entry for {addr}");
            host
        }
    }
}

/// Neighbour cache of the running platform.
pub fn system_cache() -> Arc<dyn NeighborCache> {
    if cfg!(target_os = "linux") {
        Arc::new(ProcNeighborCache::default())
    } else {
        Arc::new(ArpCommandCache)
    }
}

/// Reads the Linux kernel table exposed under `/proc/net/arp`.
#[derive(Debug, Clone)]
pub struct ProcNeighborCache {
    path: String,
}

impl Default for ProcNeighborCache {
    fn default() -> Self {
        Self {
            path: PROC_ARP_PATH.to_string(),
        }
    }
}

impl ProcNeighborCache {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> HashMap<Ipv4Addr, MacAddr> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => parse_proc_arp(&content),
            Err(e) => {
                debug!("failed to read {}: {e}", self.path);
                HashMap::new()
            }
        }
    }
}

impl NeighborCache for ProcNeighborCache {
    fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.read_table().remove(&addr)
    }

    fn snapshot(&self, addrs: &[Ipv4Addr]) -> HashMap<Ipv4Addr, MacAddr> {
        let mut table = self.read_table();
        table.retain(|addr, _| addrs.contains(addr));
        table
    }
}

/// Asks the `arp` tool about one address at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArpCommandCache;

impl NeighborCache for ArpCommandCache {
    fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        let output = match Command::new("arp").args(arp_args(addr)).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("failed to execute arp: {e}");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_arp_output(&stdout, addr)
    }
}

/// Asks for the single entry of `addr`. Windows lists it with `-a`.
fn arp_args(addr: Ipv4Addr) -> [String; 2] {
    let flag: &str = if cfg!(target_os = "windows") { "-a" } else { "-n" };
    [flag.to_string(), addr.to_string()]
}

/// Parses `/proc/net/arp`:
///
/// ```text
/// IP address       HW type     Flags       HW address            Mask     Device
/// 10.10.0.1        0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
/// ```
///
/// Incomplete entries and the all-zero address are dropped.
pub fn parse_proc_arp(content: &str) -> HashMap<Ipv4Addr, MacAddr> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 || parts[2] == INCOMPLETE_FLAGS {
                return None;
            }

            let ip: Ipv4Addr = parts[0].parse().ok()?;
            let mac: MacAddr = parse_mac(parts[3])?;
            Some((ip, mac))
        })
        .collect()
}

/// Finds the hardware address of `addr` in `arp -n` style output.
///
/// Only lines mentioning the address are considered; the MAC is the first
/// 17 character token using `:` or `-` separators.
pub fn parse_arp_output(output: &str, addr: Ipv4Addr) -> Option<MacAddr> {
    let addr_str: String = addr.to_string();

    output
        .lines()
        .filter(|line| mentions_addr(line, &addr_str))
        .flat_map(|line| line.split_whitespace())
        .filter(|token| token.len() == 17 && (token.contains(':') || token.contains('-')))
        .find_map(parse_mac)
}

fn mentions_addr(line: &str, addr_str: &str) -> bool {
    line.split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .any(|token| token == addr_str)
}

fn parse_mac(raw: &str) -> Option<MacAddr> {
    let normalized: String = raw.to_ascii_lowercase().replace('-', ":");
    MacAddr::from_str(&normalized)
        .ok()
        .filter(|mac| *mac != MacAddr::zero())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
