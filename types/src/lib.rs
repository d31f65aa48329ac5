//! Fundamental types for the peerlink sidecar.
//!
//! This crate defines what every other crate in the workspace shares:
//! peer records exchanged with the peering service, the main node endpoint,
//! the error taxonomy, and the abstract seams (directory, peering service,
//! file availability) that real clients and test nullables implement.

pub mod directory;
pub mod endpoint;
pub mod error;
pub mod peer;
pub mod peering;
pub mod wait;

pub use directory::PeerDirectory;
pub use endpoint::Endpoint;
pub use error::{ConfigError, CycleError, IdentityError, RemoteError, ResolutionError};
pub use peer::{NewPeer, PeerRecord};
pub use peering::PeeringApi;
pub use wait::FileWaiter;
