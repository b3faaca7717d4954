use thiserror::Error;

/// Structural failures that abort a sweep before or instead of probing.
///
/// Per-host trouble (timeouts, transport errors, missing neighbour entries) is never
/// reported through this type; it ends up in the sweep results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// Malformed IPv4 address or a prefix length outside `0..=32`.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// The subnet holds more hosts than the configured safety bound.
    #[error("{hosts} hosts exceed the sweep limit of {limit}")]
    RangeTooLarge { hosts: u64, limit: u64 },
}

impl SweepError {
    /// Process exit code a command line front end should use for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            SweepError::InvalidAddress(_) => 2,
            SweepError::RangeTooLarge { .. } => 3,
        }
    }
}
