//! Bounded-concurrency sweep over every host of a subnet.
//!
//! Probes are fanned out onto the runtime, with a semaphore capping how many run
//! at once. Results arrive in completion order and are sorted by address before
//! they leave this module.
//!
//! A [`StopSignal`] ends the sweep early: no further probes are dispatched,
//! in-flight probes are dropped at their next await point, and whatever finished
//! before the stop is returned with `interrupted` set.

use std::net::Ipv4Addr;
use std::sync::Arc;

use sweepr_common::config::SweepConfig;
use sweepr_common::error::SweepError;
use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::subnet::NetworkDescriptor;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::probe::{self, LivenessProbe, ProbeSettings};

/// Called once for every address that finished probing.
pub type ProgressFn = Arc<dyn Fn(&ProbeResult) + Send + Sync>;

/// Cloneable handle used to stop a running sweep from anywhere.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Requests a stop. Calling it again has no further effect.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`stop`](Self::stop) has been called.
    pub async fn stopped(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this only returns on a stop.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// Raw sweep output, before any hardware address resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// One entry per probed address, ascending.
    pub results: Vec<ProbeResult>,
    pub interrupted: bool,
}

impl SweepOutcome {
    /// Addresses that answered, ascending.
    pub fn live(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.results
            .iter()
            .filter(|result| result.reachable)
            .map(|result| result.address)
    }
}

/// Probes every host of `descriptor` with at most `cfg.concurrency` probes in flight.
///
/// Fails only when the subnet is larger than `cfg.max_hosts`, in which case nothing
/// is sent. Individual probe failures are folded into the results as unreachable.
pub async fn sweep(
    descriptor: &NetworkDescriptor,
    probe: Arc<dyn LivenessProbe>,
    cfg: &SweepConfig,
    stop: &StopSignal,
    on_probed: Option<ProgressFn>,
) -> Result<SweepOutcome, SweepError> {
    let host_count: u64 = descriptor.host_count();
    if host_count > cfg.max_hosts {
        return Err(SweepError::RangeTooLarge {
            hosts: host_count,
            limit: cfg.max_hosts,
        });
    }
    if host_count == 0 {
        debug!("{descriptor} has no assignable hosts, nothing to sweep");
        return Ok(SweepOutcome::default());
    }

    let settings: ProbeSettings = ProbeSettings::from(cfg);
    let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(cfg.concurrency.max(1)));
    let mut workers: JoinSet<Option<ProbeResult>> = JoinSet::new();

    for addr in descriptor.hosts() {
        let permit = tokio::select! {
            biased;
            _ = stop.stopped() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let probe = Arc::clone(&probe);
        let stop = stop.clone();
        let on_probed = on_probed.clone();

        workers.spawn(async move {
            let _permit = permit;
            let result = tokio::select! {
                biased;
                _ = stop.stopped() => return None,
                result = probe::probe_host(probe.as_ref(), addr, settings) => result,
            };
            if let Some(callback) = on_probed {
                callback(&result);
            }
            Some(result)
        });
    }

    let mut results: Vec<ProbeResult> = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => warn!("probe worker failed: {e}"),
        }
    }

    results.sort_by_key(|result| result.address);
    let interrupted: bool = stop.is_stopped() && (results.len() as u64) < host_count;

    Ok(SweepOutcome {
        results,
        interrupted,
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
