//! # EHR Types
//!
//! Small validated primitives shared by the EHR crates.
//!
//! - [`NonEmptyText`] for configuration values that must carry content
//!   (database names, admin usernames).
//! - [`SecretText`] for credentials that must never be echoed into logs.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A non-empty credential whose `Debug` and `Display` output is redacted.
///
/// Unlike [`NonEmptyText`] the value is not trimmed: surrounding whitespace in a
/// password is significant.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretText(String);

impl SecretText {
    /// Placeholder written wherever the secret would otherwise be printed.
    pub const REDACTED: &'static str = "****";

    /// Wraps a credential.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the input is empty or whitespace-only.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    /// Exposes the raw credential. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretText").field(&Self::REDACTED).finish()
    }
}

impl std::fmt::Display for SecretText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Self::REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  ehr_database \n").expect("valid text");
        assert_eq!(text.as_str(), "ehr_database");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_blank_strings() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("blank is invalid");
        assert!(err.to_string().contains("Text cannot be empty"));
    }

    #[test]
    fn secret_text_keeps_whitespace_and_redacts_output() {
        let secret = SecretText::new(" s3cret ").expect("valid secret");
        assert_eq!(secret.expose(), " s3cret ");
        assert_eq!(secret.to_string(), "****");
        assert!(!format!("{secret:?}").contains("s3cret"));
    }

    #[test]
    fn secret_text_rejects_blank() {
        assert_eq!(SecretText::new("  ").map(|_| ()), Err(TextError::Empty));
    }
}
