//! # API Shared
//!
//! Shared utilities and definitions for the EHR APIs.
//!
//! Contains:
//! - Response bodies (`responses` module)
//! - Shared services like `HealthService`
//! - Admin credential checks
//!
//! Used by `api-rest`.

pub mod auth;
pub mod health;
pub mod responses;

pub use auth::{AdminCredentials, AuthError};
pub use health::HealthService;
pub use responses::*;
