//! JSON response bodies returned by the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Acknowledgement of a successful write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub message: String,
    /// Identity generated by the document store (not the `patientID`).
    pub patient_id: String,
}

/// Error body: a single human-readable `detail`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_patient_res_wire_names() {
        let res = CreatePatientRes {
            message: "Patient record created successfully".into(),
            patient_id: "abc".into(),
        };
        assert_eq!(
            serde_json::to_value(res).unwrap(),
            json!({"message": "Patient record created successfully", "patient_id": "abc"})
        );
    }

    #[test]
    fn error_res_uses_detail() {
        let res = ErrorRes {
            detail: "Patient not found".into(),
        };
        assert_eq!(
            serde_json::to_value(res).unwrap(),
            json!({"detail": "Patient not found"})
        );
    }
}
