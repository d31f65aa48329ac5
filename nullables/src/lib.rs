//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the sidecar (membership directory, peering
//! service, key file provisioning) sits behind a trait in `peerlink-types`.
//! This crate provides in-memory implementations that:
//! - Return scripted, deterministic answers
//! - Record every call for assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real clients for nullables in tests.

pub mod directory;
pub mod peering;
pub mod wait;

pub use directory::NullDirectory;
pub use peering::{NullPeering, PeeringCall};
pub use wait::NullWaiter;
