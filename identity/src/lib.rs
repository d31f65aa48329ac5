//! Peer identity for the peerlink sidecar.
//!
//! - **Ed25519** private key, PEM-encoded PKCS#8, provisioned by a co-located
//!   process and waited for on disk
//! - **PeerID** derived from the public key with the libp2p scheme
//! - **Multiaddress** `/ip4/<ip>/tcp/<port>/p2p/<peer id>` advertised to the
//!   main node

pub mod address;
pub mod keys;
pub mod loader;

pub use address::LocalAddress;
pub use keys::{decode_identity_pem, Identity};
pub use loader::{load_identity, PollingWaiter, DEFAULT_POLL_INTERVAL};
pub use libp2p_identity::PeerId;
