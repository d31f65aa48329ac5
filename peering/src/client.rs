//! HTTP client for the main node's peer REST API.

use std::time::Duration;

use async_trait::async_trait;
use peerlink_types::{ConfigError, Endpoint, NewPeer, PeerRecord, PeeringApi, RemoteError};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

/// Default port of the node REST API.
pub const DEFAULT_REST_PORT: u16 = 14265;

/// Path of the peer collection.
pub const PEERS_PATH: &str = "/api/core/v2/peers";

/// Default timeout for peering requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Talks to `http://<main node>:<port>/api/core/v2/peers`.
///
/// The endpoint is passed per call since the main node may move between
/// cycles.
#[derive(Clone)]
pub struct PeeringClient {
    http: reqwest::Client,
    port: u16,
}

impl PeeringClient {
    pub fn new(port: u16, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ConfigError::invalid("peering client", e.to_string()))?;
        Ok(Self { http, port })
    }

    pub fn with_default_timeout(port: u16) -> Result<Self, ConfigError> {
        Self::new(port, DEFAULT_TIMEOUT)
    }

    pub fn peers_url(&self, endpoint: &Endpoint) -> String {
        format!("http://{}{}", endpoint.authority(self.port), PEERS_PATH)
    }

    pub fn peer_url(&self, endpoint: &Endpoint, peer_id: &str) -> String {
        format!("{}/{}", self.peers_url(endpoint), peer_id)
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        RemoteError::Transport(format!("connection failed: {e}"))
    } else {
        RemoteError::Transport(e.to_string())
    }
}

async fn unexpected_status(response: reqwest::Response) -> RemoteError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("failed to read body: {e}"),
    };
    RemoteError::UnexpectedStatus { status, body }
}

/// Decode each entry on its own, skipping entries of an unexpected shape.
///
/// Only the list as a whole has to be well-formed; one odd entry from another
/// peer must not hide the rest of the table.
fn decode_peers(values: Vec<serde_json::Value>) -> Vec<PeerRecord> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PeerRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable peer record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PeeringApi for PeeringClient {
    async fn list_peers(&self, endpoint: &Endpoint) -> Result<Vec<PeerRecord>, RemoteError> {
        let response = self
            .http
            .get(self.peers_url(endpoint))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }

        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("failed to parse peers: {e}")))?;
        Ok(decode_peers(values))
    }

    async fn add_peer(&self, endpoint: &Endpoint, peer: &NewPeer) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.peers_url(endpoint))
            .header(ACCEPT, "application/json")
            .json(peer)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    async fn remove_peer(&self, endpoint: &Endpoint, peer_id: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(self.peer_url(endpoint, peer_id))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }
}
