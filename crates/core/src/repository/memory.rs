//! In-process document store.
//!
//! Documents are kept in insertion order, so "first match" is the earliest
//! inserted document with the given `patientID`. Update semantics follow the
//! MongoDB backend: field updates overwrite top-level keys, appends create a
//! missing array and fail on a value that is not an array.

use super::{Document, DocumentStore, RecordArray, StoreConnector, StoreError, StoreResult};
use crate::connection::ConnectionDetails;
use crate::constants::{DOCUMENT_ID_FIELD, MEDICAL_RECORDS_FIELD, PATIENT_ID_FIELD};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

const BACKEND: &str = "memory";

fn poisoned() -> StoreError {
    StoreError::Backend {
        backend: BACKEND,
        message: "store lock poisoned".into(),
    }
}

fn matches(document: &Document, patient_id: &str) -> bool {
    document.get(PATIENT_ID_FIELD).and_then(Value::as_str) == Some(patient_id)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A cheaply cloneable handle to one in-memory collection of patient documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Document>>> {
        self.documents.read().map_err(|_| poisoned())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents.write().map_err(|_| poisoned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn insert(&self, mut document: Document) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        document.insert(DOCUMENT_ID_FIELD.to_string(), Value::String(id.clone()));
        self.write()?.push(document);
        Ok(id)
    }

    async fn find_by_patient_id(&self, patient_id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .read()?
            .iter()
            .find(|doc| matches(doc, patient_id))
            .cloned())
    }

    async fn update_fields(&self, patient_id: &str, fields: Document) -> StoreResult<u64> {
        let mut documents = self.write()?;
        let Some(document) = documents.iter_mut().find(|doc| matches(doc, patient_id)) else {
            return Ok(0);
        };
        for (key, value) in fields {
            document.insert(key, value);
        }
        Ok(1)
    }

    async fn push_to_array(
        &self,
        patient_id: &str,
        array: RecordArray,
        element: Value,
    ) -> StoreResult<u64> {
        let mut documents = self.write()?;
        let Some(document) = documents.iter_mut().find(|doc| matches(doc, patient_id)) else {
            return Ok(0);
        };

        let records = document
            .entry(MEDICAL_RECORDS_FIELD)
            .or_insert_with(|| Value::Object(Map::new()));
        let records_type = type_name(records);
        let Value::Object(records) = records else {
            return Err(StoreError::Backend {
                backend: BACKEND,
                message: format!(
                    "cannot create field '{}' in '{MEDICAL_RECORDS_FIELD}' of type {records_type}",
                    array.key()
                ),
            });
        };

        match records
            .entry(array.key())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(element);
                Ok(1)
            }
            other => Err(StoreError::Backend {
                backend: BACKEND,
                message: format!(
                    "the field '{}' must be an array but is of type {}",
                    array.path(),
                    type_name(other)
                ),
            }),
        }
    }
}

/// Hands out in-memory stores, one per connection target.
///
/// Connecting twice to the same host, port and database returns handles to the
/// same data, the way two clients of one server would see the same collection.
///
/// Stores are never evicted: every distinct target passed to `connect` keeps
/// its documents in memory for the life of the process. This backend is meant
/// for development and tests, not for long-running deployments.
#[derive(Default)]
pub struct MemoryConnector {
    stores: Mutex<HashMap<String, MemoryStore>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(details: &ConnectionDetails) -> String {
        format!("{}:{}/{}", details.host, details.port, details.database)
    }

    /// The store a connection to `details` would use, creating it if needed.
    pub fn store_for(&self, details: &ConnectionDetails) -> StoreResult<MemoryStore> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StoreError::Connection("memory connector lock poisoned".into()))?;
        Ok(stores.entry(Self::target(details)).or_default().clone())
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(&self, details: &ConnectionDetails) -> StoreResult<Arc<dyn DocumentStore>> {
        if details.host.trim().is_empty() {
            return Err(StoreError::Connection("host cannot be empty".into()));
        }
        if details.database.trim().is_empty() {
            return Err(StoreError::Connection("database name cannot be empty".into()));
        }
        Ok(Arc::new(self.store_for(details)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures;
    use serde_json::json;

    fn document(patient_id: &str, name: &str) -> Document {
        let mut doc = fixtures::patient(patient_id).to_document().unwrap();
        doc.insert("name".into(), json!(name));
        doc
    }

    fn details(host: &str, database: &str) -> ConnectionDetails {
        ConnectionDetails {
            host: host.into(),
            port: 27017,
            username: None,
            password: None,
            database: database.into(),
        }
    }

    #[tokio::test]
    async fn insert_generates_distinct_identities() {
        let store = MemoryStore::new();
        let a = store.insert(document("p1", "Jane")).await.unwrap();
        let b = store.insert(document("p2", "John")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.document_count().unwrap(), 2);

        let found = store.find_by_patient_id("p1").await.unwrap().unwrap();
        assert_eq!(found["_id"], json!(a));
    }

    #[tokio::test]
    async fn find_returns_first_inserted_match() {
        let store = MemoryStore::new();
        store.insert(document("dup", "First")).await.unwrap();
        store.insert(document("dup", "Second")).await.unwrap();

        let found = store.find_by_patient_id("dup").await.unwrap().unwrap();
        assert_eq!(found["name"], "First");
        assert!(store.find_by_patient_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_fields_is_a_shallow_merge() {
        let store = MemoryStore::new();
        store.insert(document("p1", "Jane")).await.unwrap();

        let mut fields = Document::new();
        fields.insert("age".into(), json!(40));
        assert_eq!(store.update_fields("p1", fields).await.unwrap(), 1);

        let found = store.find_by_patient_id("p1").await.unwrap().unwrap();
        assert_eq!(found["age"], 40);
        assert_eq!(found["name"], "Jane");
        assert_eq!(found["region"], "NE");

        assert_eq!(
            store.update_fields("missing", Document::new()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn push_appends_in_order_and_creates_missing_array() {
        let store = MemoryStore::new();
        let mut doc = document("p1", "Jane");
        doc.remove("medicalRecords");
        store.insert(doc).await.unwrap();

        store
            .push_to_array("p1", RecordArray::Conditions, json!({"id": "c1"}))
            .await
            .unwrap();
        store
            .push_to_array("p1", RecordArray::Conditions, json!({"id": "c2"}))
            .await
            .unwrap();

        let found = store.find_by_patient_id("p1").await.unwrap().unwrap();
        assert_eq!(
            found["medicalRecords"]["conditions"],
            json!([{"id": "c1"}, {"id": "c2"}])
        );
        assert!(found["medicalRecords"].get("medications").is_none());

        assert_eq!(
            store
                .push_to_array("missing", RecordArray::Medications, json!({}))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn push_fails_when_target_is_not_an_array() {
        let store = MemoryStore::new();
        let mut doc = document("p1", "Jane");
        doc.insert("medicalRecords".into(), json!({"observations": "none"}));
        store.insert(doc).await.unwrap();

        let err = store
            .push_to_array("p1", RecordArray::Observations, json!({"id": "o1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[tokio::test]
    async fn connector_shares_data_per_target() {
        let connector = MemoryConnector::new();
        let first = connector.connect(&details("localhost", "ehr")).await.unwrap();
        first.insert(document("p1", "Jane")).await.unwrap();

        let same = connector.connect(&details("localhost", "ehr")).await.unwrap();
        assert!(same.find_by_patient_id("p1").await.unwrap().is_some());

        let other = connector.connect(&details("localhost", "other")).await.unwrap();
        assert!(other.find_by_patient_id("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stores_are_kept_after_switching_targets() {
        let connector = MemoryConnector::new();
        let first = connector.connect(&details("localhost", "ehr")).await.unwrap();
        first.insert(document("p1", "Jane")).await.unwrap();
        drop(first);

        for host in ["replica-a", "replica-b"] {
            connector.connect(&details(host, "ehr")).await.unwrap();
        }

        let kept = connector.store_for(&details("localhost", "ehr")).unwrap();
        assert_eq!(kept.document_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn connector_rejects_blank_target() {
        let connector = MemoryConnector::new();
        assert!(matches!(
            connector.connect(&details(" ", "ehr")).await,
            Err(StoreError::Connection(_))
        ));
        assert!(matches!(
            connector.connect(&details("localhost", "")).await,
            Err(StoreError::Connection(_))
        ));
    }
}
