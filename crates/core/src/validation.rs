//! Request body validation.
//!
//! Bodies are parsed with `serde_path_to_error` so a shape mismatch reports the
//! path of the failing field (e.g. `medicalRecords.conditions[0].code`) instead
//! of only serde's message.

use crate::error::BodyErrorKind;
use crate::{RecordError, RecordResult};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Parse a JSON request body into `T`.
///
/// `what` names the expected document in error messages.
///
/// # Errors
///
/// Returns `RecordError::InvalidBody` with:
/// - `BodyErrorKind::Syntax` if the body is not well-formed JSON (including an
///   empty body or trailing characters),
/// - `BodyErrorKind::Schema` if required fields are missing or mistyped.
pub fn parse_body<T: DeserializeOwned>(what: &str, body: &[u8]) -> RecordResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let parsed = match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            return Err(mismatch(what, &path, &source));
        }
    };

    deserializer
        .end()
        .map_err(|source| mismatch(what, "", &source))?;

    Ok(parsed)
}

pub(crate) fn mismatch(what: &str, path: &str, source: &serde_json::Error) -> RecordError {
    let kind = match source.classify() {
        Category::Data => BodyErrorKind::Schema,
        Category::Syntax | Category::Eof | Category::Io => BodyErrorKind::Syntax,
    };
    let message = match kind {
        BodyErrorKind::Syntax => format!("{what} is not valid JSON: {source}"),
        BodyErrorKind::Schema => {
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path
            };
            format!("{what} schema mismatch at {path}: {source}")
        }
    };
    RecordError::InvalidBody { kind, message }
}
