//! Waiting on externally provisioned files.

use std::path::Path;

use async_trait::async_trait;

/// Suspends until a file provisioned by another process exists.
///
/// There is no deadline. The default implementation polls; a filesystem
/// watcher can stand in where one is available.
#[async_trait]
pub trait FileWaiter: Send + Sync {
    async fn wait_for(&self, path: &Path);
}
