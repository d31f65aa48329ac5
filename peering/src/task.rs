//! One full peering attempt: resolve the main node, then reconcile.

use std::sync::Arc;

use peerlink_types::{CycleError, PeerDirectory, PeeringApi};

use crate::reconciler::{reconcile, DesiredPeer, ReconcileOutcome};

/// Everything a reconciliation cycle needs, built once at startup.
///
/// The main node endpoint is resolved on every attempt and never cached.
pub struct PeeringTask {
    directory: Arc<dyn PeerDirectory>,
    api: Arc<dyn PeeringApi>,
    desired: DesiredPeer,
}

impl PeeringTask {
    pub fn new(
        directory: Arc<dyn PeerDirectory>,
        api: Arc<dyn PeeringApi>,
        desired: DesiredPeer,
    ) -> Self {
        Self {
            directory,
            api,
            desired,
        }
    }

    /// Resolve the main node and reconcile its peer table once.
    ///
    /// A failed lookup returns before the peering service is contacted.
    pub async fn run_cycle(&self) -> Result<ReconcileOutcome, CycleError> {
        let endpoint = self.directory.resolve_main_node().await?;
        tracing::debug!(%endpoint, "resolved main node");
        let outcome = reconcile(self.api.as_ref(), &endpoint, &self.desired).await?;
        Ok(outcome)
    }

    /// Run one cycle and report whether the peering is in place.
    ///
    /// Failures are logged; retrying is the caller's job.
    pub async fn try_peering(&self) -> bool {
        match self.run_cycle().await {
            Ok(outcome) if !outcome.mutated() => {
                tracing::debug!(alias = %self.desired.alias, "already peered with main node");
                true
            }
            Ok(outcome) => {
                tracing::info!(alias = %self.desired.alias, ?outcome, "peering established");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "peering attempt failed, will try again later");
                false
            }
        }
    }
}
