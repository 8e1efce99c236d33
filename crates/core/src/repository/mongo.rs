//! MongoDB-backed document store.
//!
//! Patients live in the `patients` collection of the configured database.
//! Field replacement uses `$set` and appends use `$push`, so both are atomic
//! per document on the server.

use super::{Document, DocumentStore, RecordArray, StoreConnector, StoreError, StoreResult};
use crate::connection::ConnectionDetails;
use crate::constants::{DOCUMENT_ID_FIELD, PATIENTS_COLLECTION, PATIENT_ID_FIELD};
use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::{Client, Collection};
use serde_json::Value;
use std::sync::Arc;

const BACKEND: &str = "mongodb";

fn backend_error(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend {
        backend: BACKEND,
        message: err.to_string(),
    }
}

fn patient_filter(patient_id: &str) -> BsonDocument {
    let mut filter = BsonDocument::new();
    filter.insert(PATIENT_ID_FIELD, patient_id);
    filter
}

fn to_bson_document(document: &Document) -> StoreResult<BsonDocument> {
    bson::to_document(document).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Convert a stored document to JSON, flattening the ObjectId to its hex form.
fn from_bson_document(mut document: BsonDocument) -> StoreResult<Document> {
    if let Ok(oid) = document.get_object_id(DOCUMENT_ID_FIELD) {
        document.insert(DOCUMENT_ID_FIELD, oid.to_hex());
    }
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected a document, found {other}"
        ))),
    }
}

fn inserted_identity(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

/// Handle to the patients collection of one MongoDB database.
///
/// Cloning is cheap; the underlying client is shared and released when the last
/// clone is dropped.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<BsonDocument>,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            collection: client.database(database).collection(PATIENTS_COLLECTION),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn insert(&self, document: Document) -> StoreResult<String> {
        let document = to_bson_document(&document)?;
        let result = self
            .collection
            .insert_one(document, None)
            .await
            .map_err(backend_error)?;
        Ok(inserted_identity(result.inserted_id))
    }

    async fn find_by_patient_id(&self, patient_id: &str) -> StoreResult<Option<Document>> {
        self.collection
            .find_one(patient_filter(patient_id), None)
            .await
            .map_err(backend_error)?
            .map(from_bson_document)
            .transpose()
    }

    async fn update_fields(&self, patient_id: &str, fields: Document) -> StoreResult<u64> {
        let fields = to_bson_document(&fields)?;
        let result = self
            .collection
            .update_one(patient_filter(patient_id), doc! { "$set": fields }, None)
            .await
            .map_err(backend_error)?;
        Ok(result.matched_count)
    }

    async fn push_to_array(
        &self,
        patient_id: &str,
        array: RecordArray,
        element: Value,
    ) -> StoreResult<u64> {
        let element =
            bson::to_bson(&element).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut push = BsonDocument::new();
        push.insert(array.path(), element);

        let result = self
            .collection
            .update_one(patient_filter(patient_id), doc! { "$push": push }, None)
            .await
            .map_err(backend_error)?;
        Ok(result.matched_count)
    }
}

/// Builds [`MongoStore`] handles through the official driver.
///
/// The driver connects lazily: a successful `connect` only means the URI was
/// accepted, not that the server answered.
#[derive(Clone, Copy, Debug, Default)]
pub struct MongoConnector;

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self, details: &ConnectionDetails) -> StoreResult<Arc<dyn DocumentStore>> {
        if details.database.trim().is_empty() {
            return Err(StoreError::Connection("database name cannot be empty".into()));
        }

        let client = Client::with_uri_str(details.connection_uri())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Arc::new(MongoStore::new(&client, &details.database)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn filter_targets_business_key() {
        assert_eq!(patient_filter("p1"), doc! { "patientID": "p1" });
    }

    #[test]
    fn patient_document_converts_to_bson() {
        let document = fixtures::patient("p1").to_document().unwrap();
        let bson_doc = to_bson_document(&document).expect("convert");
        assert_eq!(bson_doc.get_str("patientID").unwrap(), "p1");
        assert_eq!(bson_doc.get_i64("age").unwrap(), 30);
        assert!(bson_doc
            .get_document("medicalRecords")
            .unwrap()
            .get_array("conditions")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn stored_document_flattens_object_id() {
        let oid = ObjectId::new();
        let stored = doc! {
            "_id": oid,
            "patientID": "p1",
            "age": 30_i64,
            "medicalRecords": { "conditions": [], "medications": [], "observations": [] },
        };
        let document = from_bson_document(stored).expect("convert");
        assert_eq!(document["_id"], json!(oid.to_hex()));
        assert_eq!(document["age"], json!(30));
        assert_eq!(document["medicalRecords"]["conditions"], json!([]));
    }

    #[test]
    fn observation_nulls_survive_conversion() {
        let mut observation = fixtures::observation("o1");
        observation.value = None;
        let value = serde_json::to_value(&observation).unwrap();
        let bson_value = bson::to_bson(&value).unwrap();
        let document = match bson_value {
            Bson::Document(d) => from_bson_document(d).unwrap(),
            other => panic!("expected document, got {other:?}"),
        };
        assert_eq!(document["value"], Value::Null);
        assert_eq!(document["unit"], json!("mmHg"));
    }

    #[test]
    fn inserted_identity_uses_object_id_hex() {
        let oid = ObjectId::new();
        assert_eq!(inserted_identity(Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(inserted_identity(Bson::String("abc".into())), "abc");
    }
}
