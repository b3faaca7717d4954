//! # Subnet Model
//!
//! Turns an interface address and prefix length into a canonical
//! [`NetworkDescriptor`] and enumerates the host addresses it contains.
//!
//! Only assignable hosts are produced: the network address (all host bits
//! zero) and the broadcast address (all host bits one) are skipped. A /31 or /32
//! has no such hosts and enumerates to nothing.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::SweepError;

/// An IPv4 network in canonical form: host bits of the base address are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkDescriptor {
    base_addr: Ipv4Addr,
    prefix: u8,
}

impl NetworkDescriptor {
    /// Builds the descriptor of the network `addr` belongs to.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, SweepError> {
        let network = Ipv4Network::new(addr, prefix).map_err(|_| {
            SweepError::InvalidAddress(format!("prefix length {prefix} is outside 0..=32"))
        })?;

        Ok(Self {
            base_addr: network.network(),
            prefix,
        })
    }

    pub fn base_addr(&self) -> Ipv4Addr {
        self.base_addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(mask_bits(self.prefix))
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.base_addr) | !mask_bits(self.prefix))
    }

    /// Number of addresses in the block, network and broadcast included.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// Number of addresses [`hosts`](Self::hosts) will yield.
    pub fn host_count(&self) -> u64 {
        match self.prefix {
            31 | 32 => 0,
            _ => self.size() - 2,
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask_bits(self.prefix) == u32::from(self.base_addr)
    }

    /// Assignable host addresses in ascending order.
    ///
    /// Every call starts a fresh sequence.
    pub fn hosts(&self) -> HostAddresses {
        if self.host_count() == 0 {
            return HostAddresses::empty();
        }

        let first: u32 = u32::from(self.base_addr) + 1;
        let last: u32 = u32::from(self.broadcast()) - 1;
        HostAddresses { inner: first..=last }
    }
}

impl fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base_addr, self.prefix)
    }
}

impl FromStr for NetworkDescriptor {
    type Err = SweepError;

    /// Parses CIDR notation like "192.168.1.0/24". Host bits may be set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr_str, prefix_str)) = s.trim().split_once('/') else {
            return Err(SweepError::InvalidAddress(format!(
                "'{s}' is not in address/prefix form"
            )));
        };

        let prefix: i64 = prefix_str.trim().parse().map_err(|_| {
            SweepError::InvalidAddress(format!("invalid prefix in CIDR '{prefix_str}'"))
        })?;

        compute_subnet(addr_str.trim(), prefix)
    }
}

/// Validates a dotted-quad address and a prefix length and returns the network
/// they describe.
pub fn compute_subnet(address: &str, prefix: i64) -> Result<NetworkDescriptor, SweepError> {
    let addr: Ipv4Addr = address
        .parse()
        .map_err(|_| SweepError::InvalidAddress(format!("'{address}' is not an IPv4 address")))?;

    let prefix: u8 = u8::try_from(prefix)
        .ok()
        .filter(|p| *p <= 32)
        .ok_or_else(|| {
            SweepError::InvalidAddress(format!("prefix length {prefix} is outside 0..=32"))
        })?;

    NetworkDescriptor::new(addr, prefix)
}

/// Lazy sequence of host addresses produced by [`NetworkDescriptor::hosts`].
#[derive(Debug, Clone)]
pub struct HostAddresses {
    inner: RangeInclusive<u32>,
}

impl HostAddresses {
    fn empty() -> Self {
        #[allow(clippy::reversed_empty_ranges)]
        let inner = 1..=0;
        Self { inner }
    }
}

impl Iterator for HostAddresses {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ipv4Addr::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for HostAddresses {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Ipv4Addr::from)
    }
}

fn mask_bits(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
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
