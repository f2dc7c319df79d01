use std::sync::Arc;

use bazaar_core::{AppError, AppResult};
use bazaar_domain::{AuditReadRecord, AuditRecord, AuditRecordId};

use crate::audit_ports::{AuditGateway, AuditSearchQuery};

/// Read-side application service over the audit gateway.
#[derive(Clone)]
pub struct AuditQueryService {
    gateway: Arc<dyn AuditGateway>,
}

impl AuditQueryService {
    /// Creates a service from a gateway implementation.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuditGateway>) -> Self {
        Self { gateway }
    }

    /// Finds one record; absence is `Ok(None)`.
    pub async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        self.gateway.find_by_id(id).await
    }

    /// Lists every stored record.
    pub async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        self.gateway.find_all().await
    }

    /// Lists the records attributed to `email`, oldest first.
    pub async fn find_all_by_actor(&self, email: &str) -> AppResult<Vec<AuditReadRecord>> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation(
                "actor email must not be empty".to_owned(),
            ));
        }

        self.gateway.find_all_by_actor(email).await
    }

    /// Lists one filtered page of records.
    pub async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        self.gateway.search(query).await
    }

    /// Stores a record directly and returns it with its assigned identifier.
    ///
    /// Unlike interception, storage errors are returned to the caller.
    pub async fn create(&self, record: AuditRecord) -> AppResult<AuditReadRecord> {
        let id = self.gateway.append(record.clone()).await?;
        Ok(record.into_read_record(id))
    }
}
