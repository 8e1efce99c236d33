//! The process-wide active store handle.
//!
//! [`ActiveStore`] is the single owner of the handle every record operation
//! runs against. Readers hold the lock only long enough to clone the `Arc`;
//! reconnection holds it only for the swap. A request that cloned the previous
//! handle keeps it alive until it completes, so in-flight work never runs on a
//! released handle, but it may still finish against the old target.

use crate::repository::DocumentStore;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ActiveStore {
    current: RwLock<Arc<dyn DocumentStore>>,
}

impl ActiveStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            current: RwLock::new(store),
        }
    }

    /// A short-lived reference to the current handle for one request.
    pub async fn current(&self) -> Arc<dyn DocumentStore> {
        self.current.read().await.clone()
    }

    /// Install `next` as the active handle and return the one it replaced.
    pub async fn replace(&self, next: Arc<dyn DocumentStore>) -> Arc<dyn DocumentStore> {
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, next)
    }
}
