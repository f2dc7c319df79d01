use std::sync::Arc;

use bazaar_application::AuditGateway;
use bazaar_core::AppError;
use bazaar_infrastructure::{
    AuditSnapshotFile, OrmAuditRepository, PostgresAuditRepository, SnapshotAuditRepository,
};
use tracing::info;

use crate::api_config::{ApiConfig, AuditBackendConfig};

use super::connect_and_migrate;

/// Audit gateway selected at startup plus the lifecycle hooks it needs.
#[derive(Clone)]
pub struct AuditBackend {
    name: &'static str,
    gateway: Arc<dyn AuditGateway>,
    snapshot: Option<Arc<SnapshotAuditRepository>>,
}

impl AuditBackend {
    pub async fn connect(config: &ApiConfig) -> Result<Self, AppError> {
        let mut snapshot = None;
        let gateway: Arc<dyn AuditGateway> = match &config.audit_backend {
            AuditBackendConfig::Snapshot { path } => {
                let repository = Arc::new(
                    SnapshotAuditRepository::open(AuditSnapshotFile::new(path.clone())).await?,
                );
                snapshot = Some(repository.clone());
                repository
            }
            AuditBackendConfig::Postgres { database_url } => {
                let pool =
                    connect_and_migrate(database_url, config.database_max_connections).await?;
                Arc::new(PostgresAuditRepository::new(pool))
            }
            AuditBackendConfig::Orm { database_url } => {
                let pool =
                    connect_and_migrate(database_url, config.database_max_connections).await?;
                Arc::new(OrmAuditRepository::from_pool(pool))
            }
        };

        let backend = Self {
            name: config.audit_backend.name(),
            gateway,
            snapshot,
        };
        info!(backend = backend.name, "audit backend ready");
        Ok(backend)
    }

    #[cfg(test)]
    pub fn from_snapshot(repository: Arc<SnapshotAuditRepository>) -> Self {
        Self {
            name: "snapshot",
            gateway: repository.clone(),
            snapshot: Some(repository),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn gateway(&self) -> Arc<dyn AuditGateway> {
        self.gateway.clone()
    }

    /// Persists in-process state; relational backends have nothing to flush.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        match &self.snapshot {
            Some(repository) => repository.flush().await,
            None => Ok(()),
        }
    }
}
