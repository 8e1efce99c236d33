//! Document store abstraction.
//!
//! Every record operation goes through [`DocumentStore`], keyed by the
//! `patientID` business key rather than the identity the store assigns on
//! insert. Documents are JSON objects; each backend converts to its own
//! representation.
//!
//! Two backends are provided:
//! - [`mongo::MongoStore`] for a MongoDB deployment,
//! - [`memory::MemoryStore`] for development and tests.
//!
//! A [`StoreConnector`] builds a new store handle from [`ConnectionDetails`];
//! it is what the admin reconnection endpoint calls.

pub mod memory;
pub mod mongo;

use crate::connection::ConnectionDetails;
use crate::constants::MEDICAL_RECORDS_FIELD;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected the operation or could not be reached.
    #[error("{backend} store error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
    #[error("failed to convert document: {0}")]
    Serialization(String),
    /// A new store handle could not be constructed.
    #[error("{0}")]
    Connection(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The append-only arrays embedded in a patient's medical records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordArray {
    Conditions,
    Medications,
    Observations,
}

impl RecordArray {
    /// Key of the array inside the `medicalRecords` object.
    pub fn key(self) -> &'static str {
        match self {
            RecordArray::Conditions => "conditions",
            RecordArray::Medications => "medications",
            RecordArray::Observations => "observations",
        }
    }

    /// Dotted path of the array from the document root.
    pub fn path(self) -> String {
        format!("{MEDICAL_RECORDS_FIELD}.{}", self.key())
    }
}

/// Storage operations needed by the record service.
///
/// Lookups return the *first* document whose `patientID` matches, in an order
/// the store decides. Nothing here enforces uniqueness of `patientID`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn backend_name(&self) -> &'static str;

    /// Persist a new document and return the identity the store generated.
    async fn insert(&self, document: Document) -> StoreResult<String>;

    /// Return the first document whose `patientID` equals `patient_id`.
    async fn find_by_patient_id(&self, patient_id: &str) -> StoreResult<Option<Document>>;

    /// Replace whole top-level fields of the first matching document.
    ///
    /// Each key of `fields` overwrites the corresponding top-level field; fields
    /// not named are left untouched. Returns the number of matched documents
    /// (0 or 1).
    async fn update_fields(&self, patient_id: &str, fields: Document) -> StoreResult<u64>;

    /// Append `element` to the end of `array` in the first matching document.
    ///
    /// Returns the number of matched documents (0 or 1).
    async fn push_to_array(
        &self,
        patient_id: &str,
        array: RecordArray,
        element: Value,
    ) -> StoreResult<u64>;
}

/// Builds store handles from connection parameters.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Construct a fresh store handle.
    ///
    /// This neither migrates nor validates existing data. Handles may be built
    /// lazily, so success does not prove the target is reachable.
    async fn connect(&self, details: &ConnectionDetails) -> StoreResult<Arc<dyn DocumentStore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_paths_are_nested_under_medical_records() {
        assert_eq!(RecordArray::Conditions.path(), "medicalRecords.conditions");
        assert_eq!(RecordArray::Medications.path(), "medicalRecords.medications");
        assert_eq!(RecordArray::Observations.path(), "medicalRecords.observations");
    }
}
