//! Membership directory seam.

use async_trait::async_trait;

use crate::{Endpoint, ResolutionError};

/// Finds the main node's current location.
///
/// Implementations must resolve to exactly one endpoint. Zero or several
/// candidates are expected during rescheduling and are reported as a
/// [`ResolutionError`] so the caller can retry.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    async fn resolve_main_node(&self) -> Result<Endpoint, ResolutionError>;
}
