//! Peer reconciliation: compare the desired entry with the main node's peer
//! table and converge it.
//!
//! Per cycle: `Start → Listed → {Converged | NeedsCreate | NeedsReplace} → Done`.
//! `NeedsReplace` deletes every stale record under our alias before the
//! create. Any error ends the cycle as a failure; nothing is retried here.

use peerlink_types::{Endpoint, NewPeer, PeerRecord, PeeringApi, RemoteError};

/// The peer entry this node should have on the main node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesiredPeer {
    /// Local node name, used as the alias for idempotent lookup.
    pub alias: String,
    /// Canonical `/ip4/../tcp/../p2p/..` address.
    pub multi_address: String,
}

impl DesiredPeer {
    pub fn new(alias: impl Into<String>, multi_address: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            multi_address: multi_address.into(),
        }
    }

    fn matches(&self, record: &PeerRecord) -> bool {
        record.full_address().as_deref() == Some(self.multi_address.as_str())
    }

    fn as_new_peer(&self) -> NewPeer {
        NewPeer::new(self.multi_address.clone(), self.alias.clone())
    }
}

/// What a peer table snapshot requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// A record with our alias and address exists.
    Converged {
        /// Other records under our alias with a different address.
        stale: Vec<String>,
    },
    /// No record carries our alias.
    Create,
    /// Records carry our alias but none has our address.
    Replace { stale: Vec<String> },
}

/// Result of a successful cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    AlreadyPeered,
    /// Converged, and duplicates under our alias were removed.
    Pruned { removed: Vec<String> },
    Created,
    Replaced { removed: Vec<String> },
}

impl ReconcileOutcome {
    pub fn mutated(&self) -> bool {
        !matches!(self, Self::AlreadyPeered)
    }
}

/// Decide the action for a peer table snapshot without touching it.
///
/// A record under our alias without an id cannot be deleted, so the whole
/// snapshot is rejected before any mutation. A record without advertised
/// addresses is stale.
pub fn plan(peers: &[PeerRecord], desired: &DesiredPeer) -> Result<Plan, RemoteError> {
    let mut converged = false;
    let mut stale = Vec::new();

    for record in peers.iter().filter(|p| p.has_alias(&desired.alias)) {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| RemoteError::MalformedRecord(desired.alias.clone()))?;
        if desired.matches(record) {
            converged = true;
        } else {
            stale.push(id.to_string());
        }
    }

    Ok(if converged {
        Plan::Converged { stale }
    } else if stale.is_empty() {
        Plan::Create
    } else {
        Plan::Replace { stale }
    })
}

/// Run one list → compare → (none | create | delete + create) pass.
pub async fn reconcile(
    api: &dyn PeeringApi,
    endpoint: &Endpoint,
    desired: &DesiredPeer,
) -> Result<ReconcileOutcome, RemoteError> {
    let peers = api.list_peers(endpoint).await?;
    tracing::debug!(count = peers.len(), %endpoint, "gathered current peers");

    match plan(&peers, desired)? {
        Plan::Converged { stale } if stale.is_empty() => Ok(ReconcileOutcome::AlreadyPeered),
        Plan::Converged { stale } => {
            tracing::info!(alias = %desired.alias, ?stale, "removing duplicate peer records");
            remove_all(api, endpoint, &stale).await?;
            Ok(ReconcileOutcome::Pruned { removed: stale })
        }
        Plan::Create => {
            create(api, endpoint, desired).await?;
            Ok(ReconcileOutcome::Created)
        }
        Plan::Replace { stale } => {
            tracing::info!(
                alias = %desired.alias,
                desired = %desired.multi_address,
                ?stale,
                "peer record on main node is stale, deleting old peering"
            );
            remove_all(api, endpoint, &stale).await?;
            create(api, endpoint, desired).await?;
            Ok(ReconcileOutcome::Replaced { removed: stale })
        }
    }
}

async fn remove_all(
    api: &dyn PeeringApi,
    endpoint: &Endpoint,
    ids: &[String],
) -> Result<(), RemoteError> {
    for id in ids {
        api.remove_peer(endpoint, id).await?;
        tracing::info!(peer_id = %id, "old peering deleted");
    }
    Ok(())
}

async fn create(
    api: &dyn PeeringApi,
    endpoint: &Endpoint,
    desired: &DesiredPeer,
) -> Result<(), RemoteError> {
    tracing::info!(alias = %desired.alias, address = %desired.multi_address, "establishing peering");
    api.add_peer(endpoint, &desired.as_new_peer()).await
}
