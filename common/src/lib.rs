//! # Sweepr Common
//!
//! Shared building blocks for the sweepr workspace.
//!
//! * **[`network`]**: subnet descriptors, host enumeration, sweep results and
//!   local interface discovery.
//! * **[`error`]**: the structural errors a sweep can surface to its caller.
//! * **[`config`]**: display settings and sweep tuning.
//! * **[`log`]**: logging macros layered over `tracing`.

pub mod config;
pub mod error;
pub mod log;
pub mod network;

#[doc(hidden)]
pub use tracing as __tracing;
