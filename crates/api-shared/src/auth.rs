use ehr_types::{NonEmptyText, SecretText};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized")]
    MissingCredentials,
    #[error("Unauthorized")]
    InvalidCredentials,
}

/// The single shared admin username/password pair, resolved at startup.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    username: NonEmptyText,
    password: SecretText,
}

impl AdminCredentials {
    pub fn new(username: NonEmptyText, password: SecretText) -> Self {
        Self { username, password }
    }

    /// Validates the credentials supplied with an admin request.
    ///
    /// Passes only when both values are present and exactly equal to the
    /// configured pair. Both comparisons always run and compare SHA-256 digests
    /// in constant time, so timing reveals neither which value was wrong nor
    /// how much of it matched.
    pub fn verify(&self, username: Option<&str>, password: Option<&str>) -> Result<(), AuthError> {
        let (Some(username), Some(password)) = (username, password) else {
            tracing::warn!("admin request rejected: missing credentials");
            return Err(AuthError::MissingCredentials);
        };

        let username_ok = constant_time_eq(&digest(username), &digest(self.username.as_str()));
        let password_ok = constant_time_eq(&digest(password), &digest(self.password.expose()));

        if username_ok & password_ok {
            Ok(())
        } else {
            tracing::warn!("admin request rejected: invalid credentials");
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn digest(value: &str) -> Vec<u8> {
    Sha256::digest(value.as_bytes()).to_vec()
}

/// Constant-time comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
