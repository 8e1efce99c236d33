//! Constants used throughout the EHR core crate.
//!
//! Document field names live here so the store backends and the service layer
//! agree on the shape of a stored patient document.

/// Collection holding one document per patient.
pub const PATIENTS_COLLECTION: &str = "patients";

/// Default database used when no explicit database is configured.
pub const DEFAULT_DATABASE: &str = "ehr_database";

/// Default MongoDB host for the initial connection.
pub const DEFAULT_MONGO_HOST: &str = "localhost";

/// Default MongoDB port for the initial connection.
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// URI scheme of generated connection strings.
pub const MONGO_URI_SCHEME: &str = "mongodb";

/// Business key field of a patient document.
pub const PATIENT_ID_FIELD: &str = "patientID";

/// Field holding the embedded medical records of a patient document.
pub const MEDICAL_RECORDS_FIELD: &str = "medicalRecords";

/// Keys of the arrays embedded in `medicalRecords`.
pub const MEDICAL_RECORD_ARRAYS: [&str; 3] = ["conditions", "medications", "observations"];

/// Store-assigned identity field.
pub const DOCUMENT_ID_FIELD: &str = "_id";
