use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
/// A full /16, the largest sweep accepted without raising the limit.
pub const DEFAULT_MAX_HOSTS: u64 = 65_534;

/// Terminal behaviour, built from the global command line flags.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Skips the banner printed on startup.
    pub no_banner: bool,
    /// `0` prints everything, `1` drops headers and trees, `2` prints addresses only.
    pub quiet: u8,
    /// Never prompt and never put the terminal into raw mode.
    pub disable_input: bool,
}

/// Tuning for a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Upper bound on probes in flight at the same time.
    pub concurrency: usize,
    /// How long one probe attempt waits for a reply.
    pub timeout: Duration,
    /// Extra attempts after a negative probe. `0` sends exactly one probe per host.
    pub retries: u32,
    /// Sweeps enumerating more hosts than this fail before sending anything.
    pub max_hosts: u64,
    /// Overall time budget. When it runs out the sweep stops like an operator abort.
    pub deadline: Option<Duration>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_PROBE_TIMEOUT,
            retries: 0,
            max_hosts: DEFAULT_MAX_HOSTS,
            deadline: None,
        }
    }
}
