//! Patient document schema.
//!
//! These types define the shape of a stored patient document and of every
//! request body that writes into one. Field names match the JSON wire names
//! exactly (`patientID`, `medicalRecords`, `onsetDateTime`, ...).
//!
//! Validation is limited to type and shape: required fields must be present
//! with the right JSON type. Date-like fields are free strings and are never
//! parsed. Unknown keys are ignored rather than rejected, which also lets a
//! stored document (carrying the store's `_id`) deserialize back into a
//! [`Patient`].

use crate::constants::{MEDICAL_RECORDS_FIELD, MEDICAL_RECORD_ARRAYS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A single controlled-vocabulary term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

/// A diagnosis or problem recorded against a patient.
///
/// `id` is supplied by the caller and is not checked for uniqueness within a
/// patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    /// Codings keyed by code system label, e.g. `icd10`.
    pub code: BTreeMap<String, Vec<Coding>>,
    pub onset_date_time: String,
    pub clinical_status: String,
}

/// A prescription. Medications carry no identifier of their own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub status: String,
    pub stage: String,
    pub medication: String,
    pub patient_reference: String,
    pub context_reference: String,
    pub date_written: String,
    /// Loosely-typed dosage entries; values may be any JSON value or null.
    #[schema(value_type = Vec<Object>)]
    pub dosage_instruction: Vec<Map<String, Value>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub effective_date_time: String,
    #[schema(value_type = Vec<Object>)]
    pub components: Vec<Value>,
}

/// The clinical record collections embedded in a patient document.
///
/// Each array only grows through an explicit append, or is replaced as a whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicalRecords {
    pub conditions: Vec<Condition>,
    pub medications: Vec<Medication>,
    pub observations: Vec<Observation>,
}

impl MedicalRecords {
    /// Read medical records back from a stored document.
    ///
    /// An append against a document without `medicalRecords` creates the parent
    /// with only the target array, so arrays the store never materialised are
    /// read as empty. Request bodies still go through the strict
    /// `Deserialize` impl and must name all three arrays.
    pub fn from_stored(mut value: Value) -> Result<Self, serde_json::Error> {
        complete_stored_arrays(&mut value);
        serde_json::from_value(value)
    }
}

fn complete_stored_arrays(records: &mut Value) {
    if let Value::Object(map) = records {
        for key in MEDICAL_RECORD_ARRAYS {
            map.entry(key).or_insert_with(|| Value::Array(Vec::new()));
        }
    }
}

/// A patient document.
///
/// `patientID` is the business key used by every lookup. It is assigned by the
/// caller and is distinct from the identity the store generates on insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    #[serde(rename = "patientID")]
    pub patient_id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub region: String,
    #[serde(rename = "medicalRecords")]
    pub medical_records: MedicalRecords,
}

impl Patient {
    /// Render the patient as a store document (a JSON object).
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(serde::ser::Error::custom(
                "patient did not serialize to a JSON object",
            )),
        }
    }

    /// Read a patient back from a store document, ignoring store-level keys.
    ///
    /// Missing record arrays are read as empty, as in
    /// [`MedicalRecords::from_stored`].
    pub fn from_document(mut document: Map<String, Value>) -> Result<Self, serde_json::Error> {
        if let Some(records) = document.get_mut(MEDICAL_RECORDS_FIELD) {
            complete_stored_arrays(records);
        }
        serde_json::from_value(Value::Object(document))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_uses_wire_field_names() {
        let value = serde_json::to_value(fixtures::patient("p1")).expect("serialize");
        assert_eq!(value["patientID"], "p1");
        assert_eq!(
            value["medicalRecords"],
            json!({"conditions": [], "medications": [], "observations": []})
        );
        assert!(value.get("patient_id").is_none());
    }

    #[test]
    fn stored_records_tolerate_missing_arrays() {
        let records = MedicalRecords::from_stored(json!({
            "conditions": [serde_json::to_value(fixtures::condition("c1")).unwrap()]
        }))
        .expect("partial stored records");
        assert_eq!(records.conditions, vec![fixtures::condition("c1")]);
        assert!(records.medications.is_empty());
        assert!(records.observations.is_empty());

        let mut document = fixtures::patient("p1").to_document().unwrap();
        document.insert("medicalRecords".into(), json!({"observations": []}));
        let patient = Patient::from_document(document).expect("partial stored patient");
        assert_eq!(patient.medical_records, MedicalRecords::default());
    }

    #[test]
    fn request_records_must_name_every_array() {
        let err = serde_json::from_value::<MedicalRecords>(json!({"conditions": []})).unwrap_err();
        assert!(err.to_string().contains("missing field `medications`"));
    }

    #[test]
    fn condition_wire_shape() {
        let value = serde_json::to_value(fixtures::condition("c1")).expect("serialize");
        assert_eq!(value["onsetDateTime"], "2020-01-01");
        assert_eq!(value["clinicalStatus"], "active");
        assert_eq!(value["code"]["icd10"][0]["code"], "E11");
    }

    #[test]
    fn observation_optional_fields_default_to_null() {
        let obs: Observation = serde_json::from_value(json!({
            "id": "o1",
            "code": "8480-6",
            "effectiveDateTime": "2022-05-06",
            "components": []
        }))
        .expect("value and unit are optional");
        assert_eq!(obs.value, None);
        assert_eq!(obs.unit, None);

        let back = serde_json::to_value(&obs).expect("serialize");
        assert_eq!(back["value"], Value::Null);
        assert_eq!(back["unit"], Value::Null);
    }

    #[test]
    fn medication_dosage_allows_null_values() {
        let med: Medication = serde_json::from_value(json!({
            "status": "active",
            "stage": "ordered",
            "medication": "metformin",
            "patientReference": "Patient/p1",
            "contextReference": "Encounter/e1",
            "dateWritten": "2021-03-04",
            "dosageInstruction": [{"text": null, "doseQuantity": {"value": 500}}]
        }))
        .expect("loosely typed dosage");
        assert_eq!(med.dosage_instruction[0]["text"], Value::Null);
    }

    #[test]
    fn age_must_be_an_integer() {
        let mut value = serde_json::to_value(fixtures::patient("p1")).unwrap();
        value["age"] = json!("thirty");
        assert!(serde_json::from_value::<Patient>(value.clone()).is_err());
        value["age"] = json!(30.5);
        assert!(serde_json::from_value::<Patient>(value).is_err());
    }

    #[test]
    fn condition_code_must_map_to_codings() {
        let err = serde_json::from_value::<Condition>(json!({
            "id": "c1",
            "code": {"icd10": "E11"},
            "onsetDateTime": "2020-01-01",
            "clinicalStatus": "active"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn medical_records_are_required_on_patient() {
        let mut value = serde_json::to_value(fixtures::patient("p1")).unwrap();
        value.as_object_mut().unwrap().remove("medicalRecords");
        assert!(serde_json::from_value::<Patient>(value).is_err());
    }

    #[test]
    fn document_round_trip_ignores_store_identity() {
        let patient = fixtures::patient("p1");
        let mut document = patient.to_document().expect("document");
        document.insert("_id".into(), json!("64b7f0c2a1"));
        assert_eq!(Patient::from_document(document).expect("parse"), patient);
    }
}
