//! Loading the identity from a key file that may not exist yet.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use peerlink_types::{FileWaiter, IdentityError};

use crate::keys::{decode_identity_pem, Identity};

/// Default interval between checks for the key file.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls the filesystem on a fixed interval until the file exists.
#[derive(Clone, Debug)]
pub struct PollingWaiter {
    interval: Duration,
}

impl PollingWaiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollingWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[async_trait]
impl FileWaiter for PollingWaiter {
    async fn wait_for(&self, path: &Path) {
        loop {
            match tokio::fs::try_exists(path).await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    // Existence cannot be decided; the read reports the real problem.
                    tracing::warn!(path = %path.display(), error = %e, "cannot stat key file");
                    return;
                }
            }
            tracing::info!(
                path = %path.display(),
                retry_in = %peerlink_utils::format_duration(self.interval),
                "waiting for key file to be created"
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Wait for the key file, then decode it into an [`Identity`].
///
/// Absence is waited out indefinitely. A file that is present but unreadable
/// or malformed is an [`IdentityError`].
pub async fn load_identity(
    path: &Path,
    waiter: &dyn FileWaiter,
) -> Result<Identity, IdentityError> {
    waiter.wait_for(path).await;

    let pem = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IdentityError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let identity = decode_identity_pem(&pem)?;

    tracing::info!(peer_id = %identity.peer_id(), "loaded peer identity");
    Ok(identity)
}
