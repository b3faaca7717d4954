use std::net::Ipv4Addr;

use pnet::util::MacAddr;

use crate::network::subnet::NetworkDescriptor;

/// Outcome of probing a single host address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeResult {
    pub address: Ipv4Addr,
    pub reachable: bool,
}

impl ProbeResult {
    pub fn new(address: Ipv4Addr, reachable: bool) -> Self {
        Self { address, reachable }
    }
}

/// A reachable host paired with whatever the neighbour table knows about it.
///
/// `hardware_address` is `None` when the table holds no entry, which is a normal
/// outcome and not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedHost {
    pub address: Ipv4Addr,
    pub hardware_address: Option<MacAddr>,
}

impl ResolvedHost {
    pub fn new(address: Ipv4Addr) -> Self {
        Self {
            address,
            hardware_address: None,
        }
    }

    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.hardware_address = Some(mac);
        self
    }
}

/// The result of one sweep: every reachable host, ascending by address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    network: NetworkDescriptor,
    hosts: Vec<ResolvedHost>,
    probed: usize,
    interrupted: bool,
}

impl ScanReport {
    pub fn new(
        network: NetworkDescriptor,
        mut hosts: Vec<ResolvedHost>,
        probed: usize,
        interrupted: bool,
    ) -> Self {
        hosts.sort_by_key(|host| host.address);
        Self {
            network,
            hosts,
            probed,
            interrupted,
        }
    }

    pub fn network(&self) -> NetworkDescriptor {
        self.network
    }

    pub fn hosts(&self) -> &[ResolvedHost] {
        &self.hosts
    }

    pub fn into_hosts(self) -> Vec<ResolvedHost> {
        self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// How many addresses finished probing, reachable or not.
    pub fn probed(&self) -> usize {
        self.probed
    }

    /// `true` when the sweep was stopped before every address was probed. The
    /// hosts are then the ones confirmed before the stop.
    pub fn interrupted(&self) -> bool {
        self.interrupted
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
