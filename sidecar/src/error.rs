use peerlink_types::{ConfigError, IdentityError};
use thiserror::Error;

/// Fatal startup failures. Anything after startup is retried instead.
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}
