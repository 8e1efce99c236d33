//! Record service: the operations catalogue for patient documents.
//!
//! Every operation resolves the active store handle once, performs a single
//! store call (two when uniqueness is enforced on create) and maps "no document
//! matched" onto the appropriate not-found error. There are no retries and no
//! multi-step protocols.

use crate::active_store::ActiveStore;
use crate::constants::MEDICAL_RECORDS_FIELD;
use crate::records::{Condition, MedicalRecords, Medication, Observation, Patient};
use crate::repository::{Document, RecordArray, StoreError};
use crate::update::PatientUpdate;
use crate::{RecordError, RecordResult};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

fn to_value<T: Serialize>(value: &T) -> RecordResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<ActiveStore>,
    enforce_unique_patient_id: bool,
}

impl RecordService {
    /// Creates a service reading the handle held by `store` on every call.
    ///
    /// With `enforce_unique_patient_id` unset, several documents may share a
    /// `patientID` and lookups see the first one the store returns.
    pub fn new(store: Arc<ActiveStore>, enforce_unique_patient_id: bool) -> Self {
        Self {
            store,
            enforce_unique_patient_id,
        }
    }

    /// Stores a new patient document and returns the identity the store generated.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if:
    /// - uniqueness is enforced and a document with the same `patientID` exists
    ///   ([`RecordError::DuplicatePatientId`]),
    /// - the store rejects the insert or is unreachable ([`RecordError::Store`]).
    pub async fn create_patient(&self, patient: Patient) -> RecordResult<String> {
        let store = self.store.current().await;

        if self.enforce_unique_patient_id
            && store
                .find_by_patient_id(&patient.patient_id)
                .await?
                .is_some()
        {
            return Err(RecordError::DuplicatePatientId(patient.patient_id));
        }

        let document = patient
            .to_document()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let id = store.insert(document).await?;

        tracing::info!(
            patient_id = %patient.patient_id,
            document_id = %id,
            backend = store.backend_name(),
            "patient record created"
        );
        Ok(id)
    }

    async fn find(&self, patient_id: &str) -> RecordResult<Option<Document>> {
        Ok(self.store.current().await.find_by_patient_id(patient_id).await?)
    }

    /// Fetches the first patient document whose `patientID` matches.
    pub async fn get_patient(&self, patient_id: &str) -> RecordResult<Patient> {
        let document = self
            .find(patient_id)
            .await?
            .ok_or(RecordError::PatientNotFound)?;
        Patient::from_document(document).map_err(RecordError::MalformedDocument)
    }

    /// Replaces the named top-level fields, leaving all others untouched.
    pub async fn replace_fields(
        &self,
        patient_id: &str,
        update: PatientUpdate,
    ) -> RecordResult<()> {
        let fields = update.to_field_map()?;
        let matched = self
            .store
            .current()
            .await
            .update_fields(patient_id, fields)
            .await?;
        if matched == 0 {
            return Err(RecordError::PatientNotFound);
        }
        Ok(())
    }

    /// Returns only the embedded medical records of a patient.
    ///
    /// A missing patient and a patient without a `medicalRecords` field both
    /// yield [`RecordError::MedicalRecordsNotFound`].
    pub async fn get_medical_records(&self, patient_id: &str) -> RecordResult<MedicalRecords> {
        let records = self
            .find(patient_id)
            .await?
            .and_then(|mut document| document.remove(MEDICAL_RECORDS_FIELD))
            .filter(|records| !records.is_null())
            .ok_or(RecordError::MedicalRecordsNotFound)?;
        MedicalRecords::from_stored(records).map_err(RecordError::MalformedDocument)
    }

    /// Replaces all three medical record arrays at once.
    pub async fn replace_medical_records(
        &self,
        patient_id: &str,
        records: MedicalRecords,
    ) -> RecordResult<()> {
        let mut fields = Document::new();
        fields.insert(MEDICAL_RECORDS_FIELD.to_string(), to_value(&records)?);
        let matched = self
            .store
            .current()
            .await
            .update_fields(patient_id, fields)
            .await?;
        if matched == 0 {
            return Err(RecordError::PatientNotFound);
        }
        Ok(())
    }

    async fn append(
        &self,
        patient_id: &str,
        array: RecordArray,
        element: Value,
    ) -> RecordResult<()> {
        let matched = self
            .store
            .current()
            .await
            .push_to_array(patient_id, array, element)
            .await?;
        if matched == 0 {
            return Err(RecordError::PatientNotFound);
        }
        tracing::debug!(patient_id, array = array.key(), "medical record appended");
        Ok(())
    }

    pub async fn append_condition(
        &self,
        patient_id: &str,
        condition: Condition,
    ) -> RecordResult<()> {
        self.append(patient_id, RecordArray::Conditions, to_value(&condition)?)
            .await
    }

    pub async fn append_medication(
        &self,
        patient_id: &str,
        medication: Medication,
    ) -> RecordResult<()> {
        self.append(patient_id, RecordArray::Medications, to_value(&medication)?)
            .await
    }

    pub async fn append_observation(
        &self,
        patient_id: &str,
        observation: Observation,
    ) -> RecordResult<()> {
        self.append(patient_id, RecordArray::Observations, to_value(&observation)?)
            .await
    }
}
