//! The central **abstraction** for liveness probing.
//!
//! A probe answers one question about one address: did it answer within the
//! timeout? Concrete strategies live in the submodules: [`icmp`] builds echo
//! requests on a raw socket and needs elevated privileges, while [`ping`] hands
//! the job to the system `ping` binary and runs as any user.
//!
//! **Architectural Note:**
//! The sweep depends on [`LivenessProbe`] only. [`system_probe`] picks a strategy
//! from the privileges the process holds, so callers stay privilege agnostic.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use is_root::is_root;
use sweepr_common::config::{DEFAULT_PROBE_TIMEOUT, SweepConfig};
use sweepr_common::network::host::ProbeResult;
use thiserror::Error;
use tracing::debug;

pub mod icmp;
pub mod ping;

use icmp::IcmpProbe;
use ping::PingCommandProbe;

/// Why a single probe attempt could not produce an answer.
///
/// Never escalated past [`probe_host`]; the sweep records these as unreachable.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("probe unavailable: {0}")]
    Unavailable(String),
    #[error("malformed probe packet: {0}")]
    Malformed(String),
}

/// Sends one reachability probe to one host.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Returns `Ok(true)` only on a positive reply received within `timeout`.
    /// A silent host is `Ok(false)`.
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> Result<bool, ProbeError>;
}

/// Per-host probing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub timeout: Duration,
    /// Attempts made after the first negative one.
    pub retries: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            retries: 0,
        }
    }
}

impl From<&SweepConfig> for ProbeSettings {
    fn from(cfg: &SweepConfig) -> Self {
        Self {
            timeout: cfg.timeout,
            retries: cfg.retries,
        }
    }
}

/// Probes `addr` up to `1 + retries` times and stops at the first positive answer.
///
/// Errors count as a negative attempt and are only logged.
pub async fn probe_host(
    probe: &dyn LivenessProbe,
    addr: Ipv4Addr,
    settings: ProbeSettings,
) -> ProbeResult {
    for attempt in 0..=settings.retries {
        match probe.probe(addr, settings.timeout).await {
            Ok(true) => return ProbeResult::new(addr, true),
            Ok(false) => {}
            Err(e) => debug!("probe {} of {addr} failed: {e}", attempt + 1),
        }
    }

    ProbeResult::new(addr, false)
}

/// Picks the strongest probe this process is allowed to use.
pub fn system_probe() -> Arc<dyn LivenessProbe> {
    if is_root() {
        debug!("running privileged, probing with raw ICMP");
        Arc::new(IcmpProbe::new())
    } else {
        debug!("running unprivileged, probing with the system ping");
        Arc::new(PingCommandProbe::new())
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
