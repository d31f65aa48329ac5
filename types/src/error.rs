//! Error taxonomy shared across crates.
//!
//! `ConfigError` and `IdentityError` are fatal and stop the process before the
//! reconciliation loop starts. `ResolutionError` and `RemoteError` are
//! recoverable: they fail the current cycle and the loop retries.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not specified")]
    Missing(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("cluster configuration unavailable, is the sidecar running outside the cluster? {0}")]
    Cluster(String),

    #[error("failed to read config file {path}: {reason}")]
    File { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// The private key file exists but cannot be turned into a peer identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unable to read private key {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode private key PEM: {0}")]
    Pem(String),

    #[error("unable to parse PKCS#8 private key: {0}")]
    Pkcs8(String),

    #[error("private key is not an Ed25519 key (algorithm {0})")]
    NotEd25519(String),

    #[error("failed to derive peer id: {0}")]
    PeerId(String),
}

/// The directory lookup did not yield exactly one usable main node.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("there is not exactly 1 main node pod ({0} exist)")]
    NotExactlyOne(usize),

    #[error("main node pod {0} has no IP")]
    MissingAddress(String),

    #[error("main node pod {pod} has an invalid IP {ip:?}")]
    InvalidAddress { pod: String, ip: String },

    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

/// The peering service could not be reached or answered unexpectedly.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to peering service failed: {0}")]
    Transport(String),

    #[error("unexpected status {status} from peering service, body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid response from peering service: {0}")]
    InvalidResponse(String),

    #[error("peer record for alias {0} has no id")]
    MalformedRecord(String),
}

/// Any recoverable failure that aborts a single reconciliation cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
