//! Store reconnection.
//!
//! Repoints the process at a different store. Credential checks happen at the
//! API boundary before this service is reached; a rejected request never gets
//! here, so it cannot disturb the active handle.

use crate::active_store::ActiveStore;
use crate::connection::ConnectionDetails;
use crate::repository::StoreConnector;
use crate::{RecordError, RecordResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct ReconnectionService {
    store: Arc<ActiveStore>,
    connector: Arc<dyn StoreConnector>,
}

impl ReconnectionService {
    pub fn new(store: Arc<ActiveStore>, connector: Arc<dyn StoreConnector>) -> Self {
        Self { store, connector }
    }

    /// Builds a handle for `details` and installs it as the active store.
    ///
    /// The previous handle is released once the last request still using it
    /// completes. Existing data is neither migrated nor validated.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Connection`] if the connector cannot construct a
    /// handle; the active store is left unchanged in that case.
    pub async fn change_connection(&self, details: &ConnectionDetails) -> RecordResult<()> {
        let next = self
            .connector
            .connect(details)
            .await
            .map_err(RecordError::Connection)?;
        let backend = next.backend_name();

        let previous = self.store.replace(next).await;
        tracing::info!(
            uri = %details.redacted_uri(),
            database = %details.database,
            backend,
            previous_backend = previous.backend_name(),
            "store connection updated"
        );
        Ok(())
    }
}
