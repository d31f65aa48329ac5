//! Nullable peering service — an in-memory peer table that records calls.

use std::sync::Mutex;

use async_trait::async_trait;
use peerlink_types::{Endpoint, NewPeer, PeerRecord, PeeringApi, RemoteError};

/// A call made against the peering service, in the order it was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeeringCall {
    List(Endpoint),
    Add(Endpoint, NewPeer),
    Remove(Endpoint, String),
}

impl PeeringCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::List(_))
    }
}

/// A test peering service.
///
/// Created peers behave like the real service: the peer id is taken from the
/// `/p2p/<id>` suffix of the submitted multiaddress and the advertised
/// address is the part before it.
pub struct NullPeering {
    peers: Mutex<Vec<PeerRecord>>,
    calls: Mutex<Vec<PeeringCall>>,
    list_failure: Mutex<Option<Failure>>,
    add_failure: Mutex<Option<Failure>>,
    remove_failure: Mutex<Option<Failure>>,
    unreachable: Mutex<bool>,
}

/// A one-shot injected failure.
#[derive(Clone, Copy, Debug)]
enum Failure {
    Status(u16),
    Disconnect,
}

impl NullPeering {
    pub fn new() -> Self {
        Self::with_peers(Vec::new())
    }

    pub fn with_peers(peers: Vec<PeerRecord>) -> Self {
        Self {
            peers: Mutex::new(peers),
            calls: Mutex::new(Vec::new()),
            list_failure: Mutex::new(None),
            add_failure: Mutex::new(None),
            remove_failure: Mutex::new(None),
            unreachable: Mutex::new(false),
        }
    }

    /// Current contents of the peer table.
    pub fn peers(&self) -> Vec<PeerRecord> {
        self.peers.lock().unwrap().clone()
    }

    /// Replace the peer table, e.g. to simulate an operator edit.
    pub fn set_peers(&self, peers: Vec<PeerRecord>) {
        *self.peers.lock().unwrap() = peers;
    }

    /// All calls in order (for assertions).
    pub fn calls(&self) -> Vec<PeeringCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the create/delete calls.
    pub fn mutations(&self) -> Vec<PeeringCall> {
        self.calls().into_iter().filter(PeeringCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Answer the next list with `status`.
    pub fn fail_next_list(&self, status: u16) {
        *self.list_failure.lock().unwrap() = Some(Failure::Status(status));
    }

    /// Answer the next create with `status`.
    pub fn fail_next_add(&self, status: u16) {
        *self.add_failure.lock().unwrap() = Some(Failure::Status(status));
    }

    /// Answer the next delete with `status`.
    pub fn fail_next_remove(&self, status: u16) {
        *self.remove_failure.lock().unwrap() = Some(Failure::Status(status));
    }

    /// Drop the connection on the next delete.
    pub fn disconnect_next_remove(&self) {
        *self.remove_failure.lock().unwrap() = Some(Failure::Disconnect);
    }

    /// Fail every call with a transport error until reset.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    fn record(&self, call: PeeringCall) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if *self.unreachable.lock().unwrap() {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

impl Default for NullPeering {
    fn default() -> Self {
        Self::new()
    }
}

fn take_failure(slot: &Mutex<Option<Failure>>) -> Result<(), RemoteError> {
    match slot.lock().unwrap().take() {
        Some(Failure::Status(status)) => Err(RemoteError::UnexpectedStatus {
            status,
            body: "injected failure".into(),
        }),
        Some(Failure::Disconnect) => Err(RemoteError::Transport("connection reset".into())),
        None => Ok(()),
    }
}

#[async_trait]
impl PeeringApi for NullPeering {
    async fn list_peers(&self, endpoint: &Endpoint) -> Result<Vec<PeerRecord>, RemoteError> {
        self.record(PeeringCall::List(*endpoint))?;
        take_failure(&self.list_failure)?;
        Ok(self.peers())
    }

    async fn add_peer(&self, endpoint: &Endpoint, peer: &NewPeer) -> Result<(), RemoteError> {
        self.record(PeeringCall::Add(*endpoint, peer.clone()))?;
        take_failure(&self.add_failure)?;

        let (address, id) = match peer.multi_address.rsplit_once("/p2p/") {
            Some((address, id)) => (address.to_string(), id.to_string()),
            None => {
                return Err(RemoteError::UnexpectedStatus {
                    status: 400,
                    body: "multiaddress has no peer id".into(),
                })
            }
        };
        self.peers.lock().unwrap().push(PeerRecord {
            id: Some(id),
            alias: Some(peer.alias.clone()),
            multi_addresses: Some(vec![address]),
        });
        Ok(())
    }

    async fn remove_peer(&self, endpoint: &Endpoint, peer_id: &str) -> Result<(), RemoteError> {
        self.record(PeeringCall::Remove(*endpoint, peer_id.to_string()))?;
        take_failure(&self.remove_failure)?;

        let mut peers = self.peers.lock().unwrap();
        let before = peers.len();
        peers.retain(|p| p.id.as_deref() != Some(peer_id));
        if peers.len() == before {
            return Err(RemoteError::UnexpectedStatus {
                status: 404,
                body: format!("peer {peer_id} not found"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("10.0.0.1".parse().unwrap())
    }

    #[tokio::test]
    async fn add_splits_peer_id_from_address() {
        let service = NullPeering::new();
        service
            .add_peer(
                &endpoint(),
                &NewPeer::new("/ip4/10.0.0.5/tcp/15600/p2p/Qm123", "node-b"),
            )
            .await
            .unwrap();

        let peers = service.peers();
        assert_eq!(peers, vec![PeerRecord::new("Qm123", "node-b", &["/ip4/10.0.0.5/tcp/15600"])]);
        assert_eq!(
            peers[0].full_address().as_deref(),
            Some("/ip4/10.0.0.5/tcp/15600/p2p/Qm123")
        );
    }

    #[tokio::test]
    async fn remove_unknown_peer_is_not_found() {
        let service = NullPeering::new();
        let err = service.remove_peer(&endpoint(), "Qm404").await.unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn injected_failures_are_one_shot() {
        let service = NullPeering::new();
        service.fail_next_list(503);
        assert!(service.list_peers(&endpoint()).await.is_err());
        assert!(service.list_peers(&endpoint()).await.is_ok());
        assert_eq!(service.calls().len(), 2);
        assert!(service.mutations().is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_records_but_fails() {
        let service = NullPeering::new();
        service.set_unreachable(true);
        let err = service.list_peers(&endpoint()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
        assert_eq!(service.calls(), vec![PeeringCall::List(endpoint())]);
    }
}
