//! Bazaar API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod catalog;
mod dto;
mod error;
mod handlers;
mod middleware;
mod shutdown;
mod state;

use bazaar_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, AuditBackendConfig, init_tracing};
use crate::api_services::{AuditBackend, build_app_state, connect_and_migrate};
use crate::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        return run_migrations(&config).await;
    }

    let backend = AuditBackend::connect(&config).await?;
    let app = api_router::build_router(build_app_state(&backend, &config)?);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, backend = backend.name(), "bazaar-api listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    // Flush regardless of how the server loop ended.
    let flushed = backend.shutdown().await;
    served?;
    flushed
}

async fn run_migrations(config: &ApiConfig) -> Result<(), AppError> {
    match &config.audit_backend {
        AuditBackendConfig::Snapshot { path } => {
            info!(path = %path.display(), "snapshot audit backend has no migrations");
        }
        AuditBackendConfig::Postgres { database_url } | AuditBackendConfig::Orm { database_url } => {
            connect_and_migrate(database_url, config.database_max_connections).await?;
            info!("database migrations applied successfully");
        }
    }

    Ok(())
}
