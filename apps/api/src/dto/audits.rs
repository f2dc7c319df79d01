use bazaar_application::AuditSearchQuery;
use bazaar_core::AppError;
use bazaar_domain::{AuditAction, AuditReadRecord, AuditStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API representation of one stored audit record.
#[derive(Debug, Serialize)]
pub struct AuditRecordResponse {
    pub id: i64,
    pub create_at: DateTime<Utc>,
    pub create_by: String,
    pub action: AuditAction,
    pub status: AuditStatus,
    pub auditable_record_text: String,
}

impl From<AuditReadRecord> for AuditRecordResponse {
    fn from(value: AuditReadRecord) -> Self {
        Self {
            id: value.id().as_i64(),
            create_at: value.created_at(),
            create_by: value.created_by().to_owned(),
            action: value.action(),
            status: value.status(),
            auditable_record_text: value.auditable_record_text().to_owned(),
        }
    }
}

/// Query string accepted by the audit listing route.
#[derive(Debug, Default, Deserialize)]
pub struct AuditSearchParams {
    pub actor: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditSearchParams {
    pub fn is_unfiltered(&self) -> bool {
        self.actor.is_none()
            && self.action.is_none()
            && self.status.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }
}

impl TryFrom<AuditSearchParams> for AuditSearchQuery {
    type Error = AppError;

    fn try_from(value: AuditSearchParams) -> Result<Self, Self::Error> {
        let defaults = AuditSearchQuery::default();

        Ok(Self {
            actor: value
                .actor
                .map(|actor| actor.trim().to_owned())
                .filter(|actor| !actor.is_empty()),
            action: value
                .action
                .as_deref()
                .map(str::parse::<AuditAction>)
                .transpose()?,
            status: value
                .status
                .as_deref()
                .map(str::parse::<AuditStatus>)
                .transpose()?,
            limit: value.limit.unwrap_or(defaults.limit),
            offset: value.offset.unwrap_or(defaults.offset),
        })
    }
}
