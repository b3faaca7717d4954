use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pnet::util::MacAddr;
use sweepr_common::config::SweepConfig;
use sweepr_common::network::subnet::NetworkDescriptor;
use sweepr_core::discovery::DiscoveryService;
use sweepr_core::probe::{LivenessProbe, ProbeError};
use sweepr_core::resolver::{AddressResolver, NeighborCache};

/// Scriptable probe that records how it was driven.
#[derive(Default)]
pub struct FakeProbe {
    reachable: HashSet<Ipv4Addr>,
    failing: HashSet<Ipv4Addr>,
    latencies: HashMap<Ipv4Addr, Duration>,
    default_latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reachable(mut self, addrs: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        self.reachable.extend(addrs);
        self
    }

    pub fn failing(mut self, addr: Ipv4Addr) -> Self {
        self.failing.insert(addr);
        self
    }

    pub fn latency(mut self, addr: Ipv4Addr, latency: Duration) -> Self {
        self.latencies.insert(addr, latency);
        self
    }

    pub fn default_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Counts a probe as in flight until dropped, completed or cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(current)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LivenessProbe for FakeProbe {
    async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        let latency = self
            .latencies
            .get(&addr)
            .copied()
            .unwrap_or(self.default_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(&addr) {
            return Err(ProbeError::Unavailable(format!("injected failure for {addr}")));
        }
        Ok(self.reachable.contains(&addr))
    }
}

/// Neighbour table with fixed contents.
#[derive(Default)]
pub struct StaticNeighborCache(HashMap<Ipv4Addr, MacAddr>);

impl StaticNeighborCache {
    pub fn with(mut self, addr: Ipv4Addr, mac: MacAddr) -> Self {
        self.0.insert(addr, mac);
        self
    }
}

impl NeighborCache for StaticNeighborCache {
    fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.0.get(&addr).copied()
    }
}

pub fn service(
    probe: Arc<FakeProbe>,
    cache: StaticNeighborCache,
    config: SweepConfig,
) -> DiscoveryService {
    DiscoveryService::new(probe, AddressResolver::new(Arc::new(cache)), config)
}

pub fn net(cidr: &str) -> NetworkDescriptor {
    cidr.parse().unwrap()
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
