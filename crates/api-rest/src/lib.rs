//! # API REST
//!
//! REST API implementation for the EHR record service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! Uses `api-shared` for response bodies and the admin credential check, and
//! `ehr-core` for every data operation.

#![warn(rust_2018_idioms)]

pub mod admin;
pub mod error;
pub mod patients;

pub use error::ApiError;

use api_shared::{
    AdminCredentials, CreatePatientRes, ErrorRes, HealthRes, HealthService, MessageRes,
};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use ehr_core::{
    Coding, Condition, ConnectionDetails, CoreServices, MedicalRecords, Medication, Observation,
    Patient, PatientField, RecordService, ReconnectionService,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
///
/// Both services point at the same active store, so a reconnection made
/// through `reconnection` is seen by every later `records` call.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub reconnection: ReconnectionService,
    pub admin: Arc<AdminCredentials>,
}

impl AppState {
    pub fn new(services: CoreServices, admin: AdminCredentials) -> Self {
        Self {
            records: services.records,
            reconnection: services.reconnection,
            admin: Arc::new(admin),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        admin::change_connection,
        patients::create_patient,
        patients::get_patient,
        patients::update_patient,
        patients::get_medical_records,
        patients::update_medical_records,
        patients::add_condition,
        patients::add_medication,
        patients::add_observation,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        CreatePatientRes,
        ErrorRes,
        ConnectionDetails,
        Patient,
        PatientField,
        MedicalRecords,
        Condition,
        Coding,
        Medication,
        Observation,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with every endpoint, Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/admin/change-connection",
            post(admin::change_connection),
        )
        .route("/api/v1/patients", post(patients::create_patient))
        .route(
            "/api/v1/patients/:patient_id",
            get(patients::get_patient).put(patients::update_patient),
        )
        .route(
            "/api/v1/patients/:patient_id/medical-records",
            get(patients::get_medical_records).put(patients::update_medical_records),
        )
        .route(
            "/api/v1/patients/:patient_id/medical-records/conditions",
            post(patients::add_condition),
        )
        .route(
            "/api/v1/patients/:patient_id/medical-records/medications",
            post(patients::add_medication),
        )
        .route(
            "/api/v1/patients/:patient_id/medical-records/observations",
            post(patients::add_observation),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports process liveness only. The store is not probed.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn health_reports_alive() {
        let app = app().await;
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "EHR record service is alive");
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let app = app().await;
        let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]
            .get("/api/v1/patients/{patient_id}/medical-records/conditions")
            .is_some());
        assert!(body["paths"].get("/api/v1/admin/change-connection").is_some());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = app().await;
        let (status, _) = send(&app, get("/api/v1/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
