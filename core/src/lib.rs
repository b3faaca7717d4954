//! # Sweepr Core
//!
//! The host discovery pipeline: liveness probing, the bounded sweep that fans
//! probes out across a subnet, neighbour table lookups and the service that ties
//! them into a [`ScanReport`](sweepr_common::network::host::ScanReport).
//!
//! The [`wireless`] module holds the thin wrappers around OS tools that list
//! wireless networks and remember their names.

pub mod discovery;
pub mod probe;
pub mod resolver;
pub mod sweep;
pub mod wireless;
