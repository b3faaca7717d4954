//! Unprivileged probe backed by the system `ping` binary.
//!
//! One invocation sends exactly one echo request. Exit status zero means a reply
//! arrived in time.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{LivenessProbe, ProbeError};

/// Extra time granted to the child process on top of its own wait flag.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PingCommandProbe {
    program: String,
}

impl Default for PingCommandProbe {
    fn default() -> Self {
        Self {
            program: String::from("ping"),
        }
    }
}

impl PingCommandProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another executable with `ping` compatible flags.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl LivenessProbe for PingCommandProbe {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> Result<bool, ProbeError> {
        let mut command = Command::new(&self.program);
        command
            .args(ping_args(addr, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            ProbeError::Unavailable(format!("failed to execute {}: {e}", self.program))
        })?;

        match tokio::time::timeout(timeout + PROCESS_GRACE, child.wait()).await {
            Ok(status) => Ok(status?.success()),
            Err(_elapsed) => Ok(false),
        }
    }
}

/// Single packet, wait at most `timeout`. The wait flag differs per platform.
fn ping_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    let target: String = addr.to_string();

    #[cfg(target_os = "windows")]
    {
        let millis = timeout.as_millis().max(1).to_string();
        vec!["-n".into(), "1".into(), "-w".into(), millis, target]
    }

    #[cfg(target_os = "macos")]
    {
        let millis = timeout.as_millis().max(1).to_string();
        vec!["-c".into(), "1".into(), "-W".into(), millis, target]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // Linux ping takes whole seconds.
        let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
        vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), target]
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
