//! # EHR Core
//!
//! Core business logic for the EHR record service.
//!
//! This crate contains the patient document model and every data operation:
//! - Record schema for patients and their embedded medical records
//! - Validated partial updates of top-level patient fields
//! - The document store abstraction with MongoDB and in-memory backends
//! - The process-wide active store handle and runtime reconnection
//!
//! **No API concerns**: HTTP routing, admin credential checks and response
//! shapes belong in `api-rest` or `api-shared`.

pub mod active_store;
pub mod admin;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod records;
pub mod repository;
pub mod service;
pub mod update;
pub mod validation;

pub use active_store::ActiveStore;
pub use admin::ReconnectionService;
pub use config::{CoreConfig, StoreBackend};
pub use connection::ConnectionDetails;
pub use error::{BodyErrorKind, RecordError, RecordResult};
pub use records::{Coding, Condition, MedicalRecords, Medication, Observation, Patient};
pub use repository::{DocumentStore, RecordArray, StoreConnector, StoreError};
pub use service::RecordService;
pub use update::{PatientField, PatientUpdate};
pub use validation::parse_body;

// Re-export the shared text primitives.
pub use ehr_types::{NonEmptyText, SecretText};

use repository::memory::MemoryConnector;
use repository::mongo::MongoConnector;
use std::sync::Arc;

/// The services built from a [`CoreConfig`], sharing one active store.
#[derive(Clone)]
pub struct CoreServices {
    pub records: RecordService,
    pub reconnection: ReconnectionService,
}

impl CoreServices {
    /// Connect to the configured initial store and wire up the services.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Connection`] if the initial store handle cannot be
    /// constructed.
    pub async fn connect(cfg: &CoreConfig) -> RecordResult<Self> {
        let connector: Arc<dyn StoreConnector> = match cfg.store_backend() {
            StoreBackend::MongoDb => Arc::new(MongoConnector),
            StoreBackend::Memory => Arc::new(MemoryConnector::new()),
        };
        Self::with_connector(cfg, connector).await
    }

    /// Like [`CoreServices::connect`] with an explicit connector.
    pub async fn with_connector(
        cfg: &CoreConfig,
        connector: Arc<dyn StoreConnector>,
    ) -> RecordResult<Self> {
        let initial = connector
            .connect(cfg.initial_connection())
            .await
            .map_err(RecordError::Connection)?;
        tracing::info!(
            uri = %cfg.initial_connection().redacted_uri(),
            database = %cfg.initial_connection().database,
            backend = initial.backend_name(),
            "initial store handle created"
        );

        let active = Arc::new(ActiveStore::new(initial));
        Ok(Self {
            records: RecordService::new(active.clone(), cfg.enforce_unique_patient_id()),
            reconnection: ReconnectionService::new(active, connector),
        })
    }
}
