//! Mapping of core and auth errors onto HTTP responses.
//!
//! Every error becomes a status code plus an `ErrorRes { detail }` body. Store
//! failures are surfaced with their underlying message so operators can see
//! what the store reported.

use api_shared::{AuthError, ErrorRes};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ehr_core::{BodyErrorKind, RecordError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        let status = match &err {
            RecordError::InvalidBody {
                kind: BodyErrorKind::Syntax,
                ..
            } => StatusCode::BAD_REQUEST,
            RecordError::InvalidBody {
                kind: BodyErrorKind::Schema,
                ..
            } => StatusCode::UNPROCESSABLE_ENTITY,
            RecordError::PatientNotFound | RecordError::MedicalRecordsNotFound => {
                StatusCode::NOT_FOUND
            }
            RecordError::DuplicatePatientId(_) => StatusCode::CONFLICT,
            RecordError::Store(_)
            | RecordError::Connection(_)
            | RecordError::MalformedDocument(_)
            | RecordError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("request failed: {err:?}");
        } else if status != StatusCode::NOT_FOUND {
            tracing::warn!("request rejected: {err}");
        }

        ApiError {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError {
            status: StatusCode::UNAUTHORIZED,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes { detail: self.detail })).into_response()
    }
}
