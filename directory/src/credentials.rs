//! In-cluster access to the Kubernetes API server.

use std::path::Path;

use peerlink_types::ConfigError;

/// Where the kubelet mounts the pod's service account.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// API server location plus the pod's service-account token and CA bundle.
#[derive(Clone)]
pub struct ClusterCredentials {
    pub api_server: String,
    pub token: String,
    pub ca_pem: Vec<u8>,
}

impl ClusterCredentials {
    /// Load the credentials every pod receives when running in a cluster.
    pub fn in_cluster() -> Result<Self, ConfigError> {
        Self::from_service_account(
            std::env::var("KUBERNETES_SERVICE_HOST").ok(),
            std::env::var("KUBERNETES_SERVICE_PORT").ok(),
            Path::new(SERVICE_ACCOUNT_DIR),
        )
    }

    /// Assemble credentials from the service host/port and a mounted
    /// service-account directory (`token`, `ca.crt`).
    pub fn from_service_account(
        host: Option<String>,
        port: Option<String>,
        account_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let host = host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::Cluster("KUBERNETES_SERVICE_HOST is not set".into()))?;
        let port = port
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::Cluster("KUBERNETES_SERVICE_PORT is not set".into()))?;

        let token = read(&account_dir.join("token"))?;
        let token = String::from_utf8(token)
            .map_err(|_| ConfigError::Cluster("service account token is not UTF-8".into()))?
            .trim()
            .to_string();
        let ca_pem = read(&account_dir.join("ca.crt"))?;

        // IPv6 service hosts need brackets in the URL authority.
        let api_server = if host.contains(':') {
            format!("https://[{host}]:{port}")
        } else {
            format!("https://{host}:{port}")
        };

        Ok(Self {
            api_server,
            token,
            ca_pem,
        })
    }
}

impl std::fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("api_server", &self.api_server)
            .finish_non_exhaustive()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path)
        .map_err(|e| ConfigError::Cluster(format!("cannot read {}: {e}", path.display())))
}
