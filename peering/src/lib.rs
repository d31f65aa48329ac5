//! Keeps this node's entry in the main node's peer table correct.
//!
//! One cycle resolves the main node, lists its peers, and then either does
//! nothing, creates the entry, or deletes a stale entry and creates a fresh
//! one. The peering service derives a peer's identity from its address, so a
//! changed address is replaced rather than updated in place.

pub mod client;
pub mod reconciler;
pub mod task;

pub use client::{PeeringClient, DEFAULT_REST_PORT, PEERS_PATH};
pub use reconciler::{plan, reconcile, DesiredPeer, Plan, ReconcileOutcome};
pub use task::PeeringTask;
