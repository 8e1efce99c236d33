//! Partial updates of top-level patient fields.
//!
//! A partial update replaces whole top-level fields of a patient document and
//! leaves every other field untouched. It is a shallow merge: updating
//! `medicalRecords` replaces all three arrays at once.
//!
//! Only the declared patient fields can be named. Each entry of the request map
//! is decoded into a [`PatientField`] variant, so an unknown key (including
//! anything that looks like a store operator, such as `$where` or a dotted
//! path) fails validation before it reaches the store.

use crate::constants::{MEDICAL_RECORDS_FIELD, PATIENT_ID_FIELD};
use crate::records::MedicalRecords;
use crate::validation::{mismatch, parse_body};
use crate::{RecordError, RecordResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One replaceable top-level field of a patient, with its new value.
#[derive(Clone, Debug, PartialEq, Deserialize, ToSchema)]
pub enum PatientField {
    #[serde(rename = "patientID")]
    PatientId(String),
    #[serde(rename = "name")]
    Name(String),
    #[serde(rename = "age")]
    Age(i64),
    #[serde(rename = "gender")]
    Gender(String),
    #[serde(rename = "region")]
    Region(String),
    #[serde(rename = "medicalRecords")]
    MedicalRecords(MedicalRecords),
}

impl PatientField {
    /// The document key this field replaces.
    pub fn key(&self) -> &'static str {
        match self {
            PatientField::PatientId(_) => PATIENT_ID_FIELD,
            PatientField::Name(_) => "name",
            PatientField::Age(_) => "age",
            PatientField::Gender(_) => "gender",
            PatientField::Region(_) => "region",
            PatientField::MedicalRecords(_) => MEDICAL_RECORDS_FIELD,
        }
    }

    fn value(&self) -> Result<Value, serde_json::Error> {
        match self {
            PatientField::PatientId(v)
            | PatientField::Name(v)
            | PatientField::Gender(v)
            | PatientField::Region(v) => Ok(Value::String(v.clone())),
            PatientField::Age(v) => Ok(Value::from(*v)),
            PatientField::MedicalRecords(records) => serde_json::to_value(records),
        }
    }
}

/// A validated, non-empty set of top-level field replacements.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientUpdate {
    fields: Vec<PatientField>,
}

impl PatientUpdate {
    /// # Errors
    ///
    /// Returns `RecordError::InvalidBody` if `fields` is empty.
    pub fn new(fields: Vec<PatientField>) -> RecordResult<Self> {
        if fields.is_empty() {
            return Err(RecordError::schema(
                "patient update must name at least one field",
            ));
        }
        Ok(Self { fields })
    }

    /// Parse a JSON object of field replacements, e.g. `{"age": 40}`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidBody` if the body is not a JSON object, is
    /// empty, names an unknown field, or carries a value of the wrong type.
    pub fn from_body(body: &[u8]) -> RecordResult<Self> {
        let entries: Map<String, Value> = parse_body("Patient update", body)?;

        let mut fields = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let what = format!("Patient update field '{key}'");
            let mut entry = Map::new();
            entry.insert(key, value);
            let field = serde_path_to_error::deserialize::<_, PatientField>(Value::Object(entry))
                .map_err(|err| {
                    let path = err.path().to_string();
                    mismatch(&what, &path, err.inner())
                })?;
            fields.push(field);
        }

        Self::new(fields)
    }

    /// Render the update as a document key → value map for the store.
    pub fn to_field_map(&self) -> RecordResult<Map<String, Value>> {
        let mut map = Map::new();
        for field in &self.fields {
            let value = field
                .value()
                .map_err(|e| crate::repository::StoreError::Serialization(e.to_string()))?;
            map.insert(field.key().to_string(), value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BodyErrorKind;
    use serde_json::json;

    fn schema_message(err: RecordError) -> String {
        match err {
            RecordError::InvalidBody {
                kind: BodyErrorKind::Schema,
                message,
            } => message,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn parses_single_field() {
        let update = PatientUpdate::from_body(br#"{"age": 40}"#).expect("valid update");
        assert_eq!(update.fields, &[PatientField::Age(40)]);
        let expected = json!({"age": 40}).as_object().cloned().unwrap();
        assert_eq!(update.to_field_map().unwrap(), expected);
    }

    #[test]
    fn parses_several_fields_including_business_key() {
        let update =
            PatientUpdate::from_body(br#"{"patientID": "p2", "region": "SW"}"#).expect("valid");
        let map = update.to_field_map().unwrap();
        assert_eq!(map["patientID"], "p2");
        assert_eq!(map["region"], "SW");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn medical_records_are_validated_as_a_whole() {
        let update = PatientUpdate::from_body(
            br#"{"medicalRecords": {"conditions": [], "medications": [], "observations": []}}"#,
        )
        .expect("valid");
        assert_eq!(
            update.fields,
            [PatientField::MedicalRecords(MedicalRecords::default())]
        );

        let err = PatientUpdate::from_body(br#"{"medicalRecords": {"conditions": []}}"#)
            .unwrap_err();
        assert!(schema_message(err).contains("medicalRecords"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PatientUpdate::from_body(br#"{"nickname": "JJ"}"#).unwrap_err();
        let message = schema_message(err);
        assert!(message.contains("unknown variant `nickname`"), "{message}");
    }

    #[test]
    fn rejects_operator_like_keys() {
        let err = PatientUpdate::from_body(br#"{"$where": "1 == 1"}"#).unwrap_err();
        assert!(schema_message(err).contains("$where"));

        let err =
            PatientUpdate::from_body(br#"{"medicalRecords.conditions": []}"#).unwrap_err();
        assert!(schema_message(err).contains("medicalRecords.conditions"));
    }

    #[test]
    fn rejects_wrong_value_type() {
        let err = PatientUpdate::from_body(br#"{"age": "forty"}"#).unwrap_err();
        assert!(schema_message(err).contains("age"));
    }

    #[test]
    fn rejects_empty_update_and_non_objects() {
        assert!(matches!(
            PatientUpdate::from_body(b"{}"),
            Err(RecordError::InvalidBody { .. })
        ));
        assert!(matches!(
            PatientUpdate::from_body(b"[1, 2]"),
            Err(RecordError::InvalidBody { .. })
        ));
    }
}
