//! # Network Discovery Service
//!
//! Implements the "sweep a subnet" use case end to end.
//!
//! The service owns the collaborators a sweep needs and glues the two phases
//! together: liveness probing through [`crate::sweep`], then hardware address
//! resolution through [`AddressResolver`] for the hosts that answered.

use std::sync::Arc;
use std::time::Duration;

use sweepr_common::config::SweepConfig;
use sweepr_common::error::SweepError;
use sweepr_common::network::host::{ResolvedHost, ScanReport};
use sweepr_common::network::subnet::NetworkDescriptor;
use tracing::{debug, warn};

use crate::probe::{self, LivenessProbe};
use crate::resolver::{self, AddressResolver};
use crate::sweep::{self, ProgressFn, StopSignal};

/// Application Service for subnet discovery.
///
/// Orchestrates one discovery by:
/// 1. delegating liveness checks to the [`LivenessProbe`] under the sweep limits.
/// 2. pairing each live address with its neighbour table entry.
pub struct DiscoveryService {
    probe: Arc<dyn LivenessProbe>,
    resolver: AddressResolver,
    config: SweepConfig,
    progress: Option<ProgressFn>,
}

impl DiscoveryService {
    pub fn new(probe: Arc<dyn LivenessProbe>, resolver: AddressResolver, config: SweepConfig) -> Self {
        Self {
            probe,
            resolver,
            config,
            progress: None,
        }
    }

    /// Wired to the probe and neighbour cache of the running system.
    pub fn system(config: SweepConfig) -> Self {
        Self::new(
            probe::system_probe(),
            AddressResolver::new(resolver::system_cache()),
            config,
        )
    }

    /// Registers a callback fired once per probed address.
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Sweeps `descriptor` and resolves every host that answered.
    ///
    /// The configured deadline, if any, fires `stop` on expiry, which ends the
    /// sweep the same way an external stop does.
    pub async fn sweep(
        &self,
        descriptor: &NetworkDescriptor,
        stop: &StopSignal,
    ) -> Result<ScanReport, SweepError> {
        let deadline = self.config.deadline.map(|limit| spawn_deadline(limit, stop.clone()));

        let outcome = sweep::sweep(
            descriptor,
            Arc::clone(&self.probe),
            &self.config,
            stop,
            self.progress.clone(),
        )
        .await;

        if let Some(timer) = deadline {
            timer.abort();
        }
        let outcome = outcome?;

        let live: Vec<_> = outcome.live().collect();
        debug!(
            "{} of {} probed hosts answered on {descriptor}",
            live.len(),
            outcome.results.len()
        );

        let resolver: AddressResolver = self.resolver.clone();
        let lookup = live.clone();
        let hosts: Vec<ResolvedHost> =
            match tokio::task::spawn_blocking(move || resolver.resolve_all(lookup)).await {
                Ok(hosts) => hosts,
                Err(e) => {
                    warn!("hardware address lookup failed: {e}");
                    live.into_iter().map(ResolvedHost::new).collect()
                }
            };

        Ok(ScanReport::new(
            *descriptor,
            hosts,
            outcome.results.len(),
            outcome.interrupted,
        ))
    }
}

fn spawn_deadline(limit: Duration, stop: StopSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(limit).await;
        debug!("sweep deadline of {limit:?} reached");
        stop.stop();
    })
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
    use crate::probe::ProbeError;
    use crate::resolver::NeighborCache;
    use async_trait::async_trait;
    use pnet::util::MacAddr;
    use std::net::Ipv4Addr;

    struct OnlyGateway;

    #[async_trait]
    impl LivenessProbe for OnlyGateway {
        async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> Result<bool, ProbeError> {
            Ok(addr.octets()[3] == 1)
        }
    }

    struct GatewayMac;

    impl NeighborCache for GatewayMac {
        fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr> {
            (addr.octets()[3] == 1).then(|| MacAddr::new(0x02, 0, 0, 0, 0, 0x01))
        }
    }

    fn service() -> DiscoveryService {
        DiscoveryService::new(
            Arc::new(OnlyGateway),
            AddressResolver::new(Arc::new(GatewayMac)),
            SweepConfig::default(),
        )
    }

    #[tokio::test]
    async fn report_pairs_live_hosts_with_macs() {
        let net: NetworkDescriptor = "192.168.7.0/29".parse().unwrap();
        let report = service().sweep(&net, &StopSignal::new()).await.unwrap();

        assert_eq!(report.network(), net);
        assert_eq!(report.probed(), 6);
        assert!(!report.interrupted());
        assert_eq!(
            report.hosts(),
            &[ResolvedHost::new(Ipv4Addr::new(192, 168, 7, 1))
                .with_mac(MacAddr::new(0x02, 0, 0, 0, 0, 0x01))]
        );
    }

    #[tokio::test]
    async fn oversized_range_is_rejected() {
        let net: NetworkDescriptor = "10.0.0.0/8".parse().unwrap();
        let err = service().sweep(&net, &StopSignal::new()).await.unwrap_err();
        assert!(matches!(err, SweepError::RangeTooLarge { .. }));
    }
}
