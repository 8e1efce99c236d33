//! EHR record service binary.
//!
//! Resolves configuration from the environment once, builds the initial store
//! handle and serves the REST API until interrupted.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::AdminCredentials;
use ehr_core::{
    config::{
        flag_from_env_value, initial_connection_from_env_values, store_backend_from_env_value,
    },
    CoreConfig, CoreServices, NonEmptyText, SecretText,
};

/// Main entry point for the EHR record service
///
/// # Environment Variables
/// - `EHR_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `EHR_STORE_BACKEND`: `mongodb` (default) or `memory`
/// - `EHR_MONGO_HOST`, `EHR_MONGO_PORT`, `EHR_MONGO_USERNAME`, `EHR_MONGO_PASSWORD`,
///   `EHR_MONGO_DATABASE`: initial store connection
/// - `EHR_ADMIN_USERNAME` (default: "admin") and `EHR_ADMIN_PASSWORD` (required):
///   credentials for the admin reconnection endpoint
/// - `EHR_ENFORCE_UNIQUE_PATIENT_ID`: reject creates whose `patientID` already exists
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid or the admin password is missing,
/// - the initial store handle cannot be built,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ehr=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("api_shared=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("EHR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let store_backend = store_backend_from_env_value(std::env::var("EHR_STORE_BACKEND").ok())?;
    let initial_connection = initial_connection_from_env_values(
        std::env::var("EHR_MONGO_HOST").ok(),
        std::env::var("EHR_MONGO_PORT").ok(),
        std::env::var("EHR_MONGO_USERNAME").ok(),
        std::env::var("EHR_MONGO_PASSWORD").ok(),
        std::env::var("EHR_MONGO_DATABASE").ok(),
    )?;
    let enforce_unique =
        flag_from_env_value(std::env::var("EHR_ENFORCE_UNIQUE_PATIENT_ID").ok())?;
    let cfg = CoreConfig::new(store_backend, initial_connection, enforce_unique)?;

    let admin = admin_credentials_from_env()?;
    let services = CoreServices::connect(&cfg).await?;

    let app = api_rest::router(AppState::new(services, admin));

    tracing::info!("++ Starting EHR REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn admin_credentials_from_env() -> anyhow::Result<AdminCredentials> {
    let username = std::env::var("EHR_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let username = NonEmptyText::new(username)
        .map_err(|_| anyhow::anyhow!("EHR_ADMIN_USERNAME cannot be empty"))?;

    let password = std::env::var("EHR_ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("EHR_ADMIN_PASSWORD must be set"))?;
    let password = SecretText::new(password)
        .map_err(|_| anyhow::anyhow!("EHR_ADMIN_PASSWORD cannot be empty"))?;

    Ok(AdminCredentials::new(username, password))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down EHR REST");
}
