//! Logging macros used across the workspace.
//!
//! They forward to `tracing`, so whichever subscriber the binary installs decides
//! how the events look. `success!` is an `INFO` event on its own target, which lets
//! the terminal formatter give it a distinct marker.

/// Target used for events that mark a completed step.
pub const SUCCESS_TARGET: &str = "sweepr::success";

/// Target used for raw, pre-formatted terminal lines.
pub const PRINT_TARGET: &str = "sweepr::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "sweepr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
