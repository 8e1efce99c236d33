//! Patient and medical-record endpoints.
//!
//! Bodies are taken as raw bytes and parsed with [`ehr_core::parse_body`] so a
//! malformed body is reported as 400 (bad JSON) or 422 (wrong shape) with the
//! path of the offending field, in the same `{"detail": ...}` form as every
//! other error.

use crate::{ApiError, AppState};
use api_shared::{CreatePatientRes, ErrorRes, MessageRes};
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use ehr_core::{
    parse_body, Condition, MedicalRecords, Medication, Observation, Patient, PatientField,
    PatientUpdate,
};

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = Patient,
    responses(
        (status = 200, description = "Patient created", body = CreatePatientRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 409, description = "patientID already exists", body = ErrorRes),
        (status = 422, description = "Body does not match the patient schema", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Create a patient document
///
/// Returns the identity the store generated for the new document, not the
/// caller's `patientID`.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreatePatientRes>, ApiError> {
    let patient: Patient = parse_body("Patient", &body)?;
    let patient_id = state.records.create_patient(patient).await?;
    Ok(Json(CreatePatientRes {
        message: "Patient record created successfully".into(),
        patient_id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    responses(
        (status = 200, description = "Patient document", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.records.get_patient(&patient_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    request_body(
        content = PatientField,
        description = "Object naming one or more top-level patient fields with their new values"
    ),
    responses(
        (status = 200, description = "Fields replaced", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Unknown field or mistyped value", body = ErrorRes)
    )
)]
/// Replace top-level fields of a patient
///
/// Only the named fields change. `medicalRecords` given here replaces the
/// whole embedded value.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    let update = PatientUpdate::from_body(&body)?;
    state.records.replace_fields(&patient_id, update).await?;
    Ok(Json(MessageRes::new("Patient record updated successfully")))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/medical-records",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    responses(
        (status = 200, description = "Embedded medical records", body = MedicalRecords),
        (status = 404, description = "Medical records not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_medical_records(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<MedicalRecords>, ApiError> {
    Ok(Json(state.records.get_medical_records(&patient_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}/medical-records",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    request_body = MedicalRecords,
    responses(
        (status = 200, description = "Medical records replaced", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Body does not match the records schema", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn update_medical_records(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    let records: MedicalRecords = parse_body("MedicalRecords", &body)?;
    state
        .records
        .replace_medical_records(&patient_id, records)
        .await?;
    Ok(Json(MessageRes::new("Medical records updated successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/medical-records/conditions",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    request_body = Condition,
    responses(
        (status = 200, description = "Condition appended", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Body does not match the condition schema", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn add_condition(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    let condition: Condition = parse_body("Condition", &body)?;
    state.records.append_condition(&patient_id, condition).await?;
    Ok(Json(MessageRes::new("Condition added successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/medical-records/medications",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    request_body = Medication,
    responses(
        (status = 200, description = "Medication appended", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Body does not match the medication schema", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn add_medication(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    let medication: Medication = parse_body("Medication", &body)?;
    state
        .records
        .append_medication(&patient_id, medication)
        .await?;
    Ok(Json(MessageRes::new("Medication added successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/medical-records/observations",
    params(("patient_id" = String, Path, description = "Business key of the patient")),
    request_body = Observation,
    responses(
        (status = 200, description = "Observation appended", body = MessageRes),
        (status = 400, description = "Body is not valid JSON", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Body does not match the observation schema", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn add_observation(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    let observation: Observation = parse_body("Observation", &body)?;
    state
        .records
        .append_observation(&patient_id, observation)
        .await?;
    Ok(Json(MessageRes::new("Observation added successfully")))
}
