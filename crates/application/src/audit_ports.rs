use async_trait::async_trait;
use bazaar_core::AppResult;
use bazaar_domain::{AuditAction, AuditReadRecord, AuditRecord, AuditRecordId, AuditStatus};

/// Port for appending audit records.
///
/// Implementations assign the identifier and never update or delete a stored
/// record. Storage failures are reported as `AppError::Unavailable`.
#[async_trait]
pub trait AuditWriter: Send + Sync {
    /// Persists one audit record and returns its assigned identifier.
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId>;
}

/// Port for reading stored audit records.
///
/// Every listing is ordered by ascending `(created_at, id)`. Absence is a
/// normal result (`None` or an empty vector), never an error.
#[async_trait]
pub trait AuditReader: Send + Sync {
    /// Finds one record by identifier.
    async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>>;

    /// Lists every stored record.
    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>>;

    /// Lists the records attributed to one actor.
    async fn find_all_by_actor(&self, actor: &str) -> AppResult<Vec<AuditReadRecord>>;

    /// Lists one page of records matching the query filters.
    async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>>;
}

/// Full audit persistence gateway: append plus reads.
pub trait AuditGateway: AuditWriter + AuditReader {}

impl<T> AuditGateway for T where T: AuditWriter + AuditReader {}

/// Filters and paging for audit record search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSearchQuery {
    /// Optional actor filter.
    pub actor: Option<String>,
    /// Optional action filter.
    pub action: Option<AuditAction>,
    /// Optional status filter.
    pub status: Option<AuditStatus>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl AuditSearchQuery {
    /// Largest page a single search returns.
    pub const MAX_LIMIT: usize = 200;
    /// Largest offset a single search honours.
    pub const MAX_OFFSET: usize = 10_000;

    /// Returns the limit clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn capped_limit(&self) -> usize {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    /// Returns the offset capped at `MAX_OFFSET`.
    #[must_use]
    pub fn capped_offset(&self) -> usize {
        self.offset.min(Self::MAX_OFFSET)
    }

    /// Returns whether a record passes every filter of this query.
    #[must_use]
    pub fn matches(&self, record: &AuditReadRecord) -> bool {
        self.actor
            .as_deref()
            .is_none_or(|actor| record.created_by() == actor)
            && self.action.is_none_or(|action| record.action() == action)
            && self.status.is_none_or(|status| record.status() == status)
    }
}

impl Default for AuditSearchQuery {
    fn default() -> Self {
        Self {
            actor: None,
            action: None,
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}
