//! Kubernetes API client for locating the main node's pod.

use std::time::Duration;

use async_trait::async_trait;
use peerlink_types::{ConfigError, Endpoint, PeerDirectory, ResolutionError};

use crate::credentials::ClusterCredentials;
use crate::pod::{select_single_endpoint, PodList};

/// Default timeout for a pod lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which pods count as the main node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// Label selector of the node daemonset, e.g. `app=hornet`.
    pub label_selector: String,
    pub namespace: String,
    /// Cluster node hosting the main node's pod.
    pub node_name: String,
}

impl DirectoryQuery {
    pub fn field_selector(&self) -> String {
        format!("spec.nodeName={}", self.node_name)
    }
}

/// Lists pods through the API server.
///
/// `GET /api/v1/namespaces/{ns}/pods?labelSelector=..&fieldSelector=spec.nodeName=..`
pub struct KubeDirectory {
    http: reqwest::Client,
    api_server: String,
    token: String,
    query: DirectoryQuery,
}

impl KubeDirectory {
    /// Build a client trusting the cluster CA and authenticating with the
    /// service-account token.
    pub fn new(
        credentials: ClusterCredentials,
        query: DirectoryQuery,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let ca = reqwest::Certificate::from_pem(&credentials.ca_pem)
            .map_err(|e| ConfigError::Cluster(format!("invalid cluster CA: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .add_root_certificate(ca)
            .build()
            .map_err(|e| ConfigError::Cluster(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(
            http,
            credentials.api_server,
            credentials.token,
            query,
        ))
    }

    pub fn with_client(
        http: reqwest::Client,
        api_server: impl Into<String>,
        token: impl Into<String>,
        query: DirectoryQuery,
    ) -> Self {
        Self {
            http,
            api_server: api_server.into(),
            token: token.into(),
            query,
        }
    }

    pub fn pods_url(&self) -> String {
        format!(
            "{}/api/v1/namespaces/{}/pods",
            self.api_server.trim_end_matches('/'),
            self.query.namespace
        )
    }

    async fn list_pods(&self) -> Result<PodList, ResolutionError> {
        let response = self
            .http
            .get(self.pods_url())
            .bearer_auth(&self.token)
            .query(&[
                ("labelSelector", self.query.label_selector.as_str()),
                ("fieldSelector", self.query.field_selector().as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolutionError::Lookup(format!("request timed out: {e}"))
                } else {
                    ResolutionError::Lookup(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolutionError::Lookup(format!(
                "HTTP status {status}, body: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ResolutionError::Lookup(format!("failed to parse pod list: {e}")))
    }
}

#[async_trait]
impl PeerDirectory for KubeDirectory {
    async fn resolve_main_node(&self) -> Result<Endpoint, ResolutionError> {
        tracing::debug!(
            selector = %self.query.label_selector,
            node = %self.query.node_name,
            "looking up main node pod"
        );
        let pods = self.list_pods().await?;
        select_single_endpoint(&pods.items)
    }
}
