//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core
//! services. Nothing in this crate reads environment variables during request
//! handling; the binary reads them and hands the raw values to the parsing
//! helpers below.

use crate::connection::ConnectionDetails;
use crate::constants::{DEFAULT_DATABASE, DEFAULT_MONGO_HOST, DEFAULT_MONGO_PORT};
use crate::{RecordError, RecordResult};
use ehr_types::{NonEmptyText, SecretText};
use std::str::FromStr;

/// Which document store implementation backs the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// A MongoDB deployment reached through the official driver.
    MongoDb,
    /// An in-process store. Data does not survive a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(RecordError::InvalidConfig(format!(
                "unknown store backend '{other}' (expected 'mongodb' or 'memory')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_backend: StoreBackend,
    initial_connection: ConnectionDetails,
    enforce_unique_patient_id: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidConfig` if the initial connection has an empty
    /// host or database name.
    pub fn new(
        store_backend: StoreBackend,
        initial_connection: ConnectionDetails,
        enforce_unique_patient_id: bool,
    ) -> RecordResult<Self> {
        if NonEmptyText::new(&initial_connection.host).is_err() {
            return Err(RecordError::InvalidConfig(
                "initial store host cannot be empty".into(),
            ));
        }
        if NonEmptyText::new(&initial_connection.database).is_err() {
            return Err(RecordError::InvalidConfig(
                "initial store database cannot be empty".into(),
            ));
        }

        Ok(Self {
            store_backend,
            initial_connection,
            enforce_unique_patient_id,
        })
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    pub fn initial_connection(&self) -> &ConnectionDetails {
        &self.initial_connection
    }

    pub fn enforce_unique_patient_id(&self) -> bool {
        self.enforce_unique_patient_id
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, MongoDB is used.
pub fn store_backend_from_env_value(value: Option<String>) -> RecordResult<StoreBackend> {
    Ok(present(value)
        .map(|v| v.parse::<StoreBackend>())
        .transpose()?
        .unwrap_or(StoreBackend::MongoDb))
}

/// Parse a TCP port, falling back to the default MongoDB port.
pub fn port_from_env_value(value: Option<String>) -> RecordResult<u16> {
    match present(value) {
        None => Ok(DEFAULT_MONGO_PORT),
        Some(v) => v
            .parse::<u16>()
            .map_err(|e| RecordError::InvalidConfig(format!("invalid port '{v}': {e}"))),
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`; unset means `false`.
pub fn flag_from_env_value(value: Option<String>) -> RecordResult<bool> {
    match present(value).map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(RecordError::InvalidConfig(format!("invalid boolean flag '{v}'"))),
        },
    }
}

/// Build the initial connection from optional raw values, applying defaults.
///
/// Credentials are only kept when both are present; a username without a
/// password (or the reverse) connects unauthenticated, as reconnection does.
pub fn initial_connection_from_env_values(
    host: Option<String>,
    port: Option<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
) -> RecordResult<ConnectionDetails> {
    let password = password
        .and_then(|p| SecretText::new(p).ok())
        .map(|p| p.expose().to_string());

    Ok(ConnectionDetails {
        host: present(host).unwrap_or_else(|| DEFAULT_MONGO_HOST.into()),
        port: port_from_env_value(port)?,
        username: present(username),
        password,
        database: present(database).unwrap_or_else(|| DEFAULT_DATABASE.into()),
    })
}
