pub mod discover;
pub mod networks;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use sweepr_common::config::{DEFAULT_CONCURRENCY, DEFAULT_MAX_HOSTS, SweepConfig};
use sweepr_common::error::SweepError;
use sweepr_common::network::subnet::NetworkDescriptor;

const DEFAULT_NAMES_FILE: &str = "wifis.txt";

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "Find the live hosts of a local subnet.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Print less; repeat for addresses only
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Never prompt and never read key presses
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the wireless networks in range
    #[command(alias = "n")]
    Networks(NetworksArgs),
    /// Discover live hosts in a subnet
    #[command(alias = "d")]
    Discover(DiscoverArgs),
}

#[derive(Args)]
pub struct NetworksArgs {
    /// File the network names are saved to
    #[arg(short, long, default_value = DEFAULT_NAMES_FILE)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// CIDR such as 192.168.1.0/24, or `lan` for the local network. Prompts when omitted.
    pub target: Option<Target>,

    /// File the network names are saved to during the interactive flow
    #[arg(short, long, default_value = DEFAULT_NAMES_FILE)]
    pub file: PathBuf,

    /// Probes in flight at the same time
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// How long each probe waits for a reply, in milliseconds
    #[arg(short, long = "timeout-ms", default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Extra attempts for hosts that stay silent
    #[arg(short, long, default_value_t = 0)]
    pub retries: u32,

    /// Refuse subnets with more hosts than this
    #[arg(long, default_value_t = DEFAULT_MAX_HOSTS)]
    pub max_hosts: u64,

    /// Stop the sweep after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,
}

impl DiscoverArgs {
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            concurrency: self.concurrency,
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
            max_hosts: self.max_hosts,
            deadline: self.deadline.map(Duration::from_secs),
        }
    }
}

/// What the operator asked to sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The subnet of the local interface.
    Lan,
    Subnet(NetworkDescriptor),
}

impl FromStr for Target {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }
        s.parse().map(Target::Subnet)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
