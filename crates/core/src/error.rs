use crate::repository::StoreError;

/// How a request body failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyErrorKind {
    /// The body is not well-formed JSON.
    Syntax,
    /// The body is JSON but does not match the expected shape.
    Schema,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{message}")]
    InvalidBody {
        kind: BodyErrorKind,
        message: String,
    },
    #[error("Patient not found")]
    PatientNotFound,
    #[error("Medical records not found")]
    MedicalRecordsNotFound,
    #[error("a patient with patientID '{0}' already exists")]
    DuplicatePatientId(String),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("Failed to update connection: {0}")]
    Connection(StoreError),
    #[error("stored patient document is malformed: {0}")]
    MalformedDocument(serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RecordError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        RecordError::InvalidBody {
            kind: BodyErrorKind::Schema,
            message: message.into(),
        }
    }
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
