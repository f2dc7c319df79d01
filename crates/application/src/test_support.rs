use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{AppError, AppResult, UserIdentity};
use bazaar_domain::{AuditReadRecord, AuditRecord, AuditRecordId};
use tokio::sync::Mutex;

use crate::{
    AuditInterceptor, AuditReader, AuditSearchQuery, AuditWriter, FixedActorResolver,
    MonotonicAuditClock,
};

/// Gateway fake keeping records in insertion order.
#[derive(Default)]
pub(crate) struct FakeAuditGateway {
    records: Mutex<Vec<AuditReadRecord>>,
}

impl FakeAuditGateway {
    pub(crate) async fn stored(&self) -> Vec<AuditReadRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AuditWriter for FakeAuditGateway {
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId> {
        let mut records = self.records.lock().await;
        let id = AuditRecordId::new(i64::try_from(records.len()).unwrap_or(i64::MAX) + 1);
        records.push(record.into_read_record(id));
        Ok(id)
    }
}

#[async_trait]
impl AuditReader for FakeAuditGateway {
    async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        Ok(self.stored().await)
    }

    async fn find_all_by_actor(&self, actor: &str) -> AppResult<Vec<AuditReadRecord>> {
        Ok(self
            .stored()
            .await
            .into_iter()
            .filter(|record| record.created_by() == actor)
            .collect())
    }

    async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        Ok(self
            .stored()
            .await
            .into_iter()
            .filter(|record| query.matches(record))
            .skip(query.capped_offset())
            .take(query.capped_limit())
            .collect())
    }
}

/// Gateway fake whose storage is always down.
#[derive(Default)]
pub(crate) struct UnavailableAuditGateway;

#[async_trait]
impl AuditWriter for UnavailableAuditGateway {
    async fn append(&self, _record: AuditRecord) -> AppResult<AuditRecordId> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }
}

#[async_trait]
impl AuditReader for UnavailableAuditGateway {
    async fn find_by_id(&self, _id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }

    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }

    async fn find_all_by_actor(&self, _actor: &str) -> AppResult<Vec<AuditReadRecord>> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }

    async fn search(&self, _query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        Err(AppError::Unavailable("connection refused".to_owned()))
    }
}

/// Writer fake that never completes within any reasonable timeout.
#[derive(Default)]
pub(crate) struct StalledAuditWriter;

#[async_trait]
impl AuditWriter for StalledAuditWriter {
    async fn append(&self, _record: AuditRecord) -> AppResult<AuditRecordId> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(AuditRecordId::new(0))
    }
}

/// Writer fake that waits before storing into the wrapped gateway.
pub(crate) struct DelayedAuditWriter {
    pub(crate) inner: Arc<FakeAuditGateway>,
    pub(crate) delay: Duration,
}

#[async_trait]
impl AuditWriter for DelayedAuditWriter {
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId> {
        tokio::time::sleep(self.delay).await;
        self.inner.append(record).await
    }
}

pub(crate) fn interceptor_for(
    writer: Arc<dyn AuditWriter>,
    principal: Option<UserIdentity>,
) -> AuditInterceptor {
    let resolver = match principal {
        Some(identity) => FixedActorResolver::new(identity),
        None => FixedActorResolver::anonymous(),
    };

    AuditInterceptor::new(
        writer,
        Arc::new(resolver),
        Arc::new(MonotonicAuditClock::new()),
    )
}
