//! Main node discovery.
//!
//! The main node runs as a pod selected by a label selector inside a
//! namespace, pinned to a named cluster node. Its IP changes whenever the pod
//! is rescheduled, so it is looked up again on every reconciliation cycle.

pub mod client;
pub mod credentials;
pub mod pod;

pub use client::{DirectoryQuery, KubeDirectory, DEFAULT_TIMEOUT};
pub use credentials::ClusterCredentials;
pub use pod::{select_single_endpoint, Pod, PodList};
