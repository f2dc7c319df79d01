use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bazaar_application::{AuditReader, AuditSearchQuery, AuditWriter};
use bazaar_core::{AppError, AppResult};
use bazaar_domain::{AuditAction, AuditReadRecord, AuditRecord, AuditRecordId, AuditStatus};

/// PostgreSQL-backed append-only audit repository using hand-written SQL.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRecordRow {
    id: i64,
    created_at: DateTime<Utc>,
    created_by: String,
    action: String,
    status: String,
    auditable_record_text: String,
}

impl TryFrom<AuditRecordRow> for AuditReadRecord {
    type Error = AppError;

    fn try_from(row: AuditRecordRow) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(row.action.as_str()).map_err(|error| {
            AppError::Internal(format!("audit record {} is unreadable: {error}", row.id))
        })?;
        let status = AuditStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!("audit record {} is unreadable: {error}", row.id))
        })?;

        Ok(AuditReadRecord::from_storage(
            AuditRecordId::new(row.id),
            row.created_at,
            row.created_by,
            action,
            status,
            row.auditable_record_text,
        ))
    }
}

fn into_read_records(rows: Vec<AuditRecordRow>) -> AppResult<Vec<AuditReadRecord>> {
    rows.into_iter().map(AuditReadRecord::try_from).collect()
}

#[async_trait]
impl AuditWriter for PostgresAuditRepository {
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_records (
                created_at,
                created_by,
                action,
                status,
                auditable_record_text
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(record.created_at())
        .bind(record.actor())
        .bind(record.action().as_str())
        .bind(record.status().as_str())
        .bind(record.auditable_record_text())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Unavailable(format!("failed to append audit record: {error}")))?;

        Ok(AuditRecordId::new(id))
    }
}

#[async_trait]
impl AuditReader for PostgresAuditRepository {
    async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        let row = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT id, created_at, created_by, action, status, auditable_record_text
            FROM audit_records
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to find audit record {id}: {error}"))
        })?;

        row.map(AuditReadRecord::try_from).transpose()
    }

    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        let rows = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT id, created_at, created_by, action, status, auditable_record_text
            FROM audit_records
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Unavailable(format!("failed to list audit records: {error}")))?;

        into_read_records(rows)
    }

    async fn find_all_by_actor(&self, actor: &str) -> AppResult<Vec<AuditReadRecord>> {
        let rows = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT id, created_at, created_by, action, status, auditable_record_text
            FROM audit_records
            WHERE created_by = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!(
                "failed to list audit records for actor '{actor}': {error}"
            ))
        })?;

        into_read_records(rows)
    }

    async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        let capped_limit = i64::try_from(query.capped_limit()).unwrap_or(i64::MAX);
        let capped_offset = i64::try_from(query.capped_offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT id, created_at, created_by, action, status, auditable_record_text
            FROM audit_records
            WHERE ($1::TEXT IS NULL OR created_by = $1)
                AND ($2::TEXT IS NULL OR action = $2)
                AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY created_at, id
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(query.actor)
        .bind(query.action.map(|action| action.as_str()))
        .bind(query.status.map(|status| status.as_str()))
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Unavailable(format!("failed to search audit records: {error}")))?;

        into_read_records(rows)
    }
}

#[cfg(test)]
mod tests;
