//! Nullable file waiter — returns immediately, remembers what was awaited.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use peerlink_types::FileWaiter;

pub struct NullWaiter {
    waited: Mutex<Vec<PathBuf>>,
}

impl NullWaiter {
    pub fn new() -> Self {
        Self {
            waited: Mutex::new(Vec::new()),
        }
    }

    /// Paths waited on, in order.
    pub fn waited(&self) -> Vec<PathBuf> {
        self.waited.lock().unwrap().clone()
    }
}

impl Default for NullWaiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileWaiter for NullWaiter {
    async fn wait_for(&self, path: &Path) {
        self.waited.lock().unwrap().push(path.to_path_buf());
    }
}
