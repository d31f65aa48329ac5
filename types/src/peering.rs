//! Peering service seam.

use async_trait::async_trait;

use crate::{Endpoint, NewPeer, PeerRecord, RemoteError};

/// Remote peer table of a node, addressed by its endpoint.
#[async_trait]
pub trait PeeringApi: Send + Sync {
    /// `GET /peers`
    async fn list_peers(&self, endpoint: &Endpoint) -> Result<Vec<PeerRecord>, RemoteError>;

    /// `POST /peers`
    async fn add_peer(&self, endpoint: &Endpoint, peer: &NewPeer) -> Result<(), RemoteError>;

    /// `DELETE /peers/{id}`
    async fn remove_peer(&self, endpoint: &Endpoint, peer_id: &str) -> Result<(), RemoteError>;
}
