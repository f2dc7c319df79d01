//! Audit record value types.
//!
//! `AuditRecord` is the write-side value built once per audited call and
//! handed to a gateway without an identifier. `AuditReadRecord` is what the
//! gateway returns after it assigned one. Neither type exposes mutators.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuditAction, AuditStatus};

/// Actor recorded when no authenticated principal is bound to the call.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Upper bound, in characters, for stored auditable text.
pub const MAX_AUDITABLE_TEXT_CHARS: usize = 2048;

const TRUNCATION_MARKER: &str = "...";

/// Bounds free-form auditable text to `MAX_AUDITABLE_TEXT_CHARS` characters.
///
/// Cuts on a character boundary and ends cut text with `...`; the marker
/// counts toward the bound.
#[must_use]
pub fn truncate_auditable_text(value: &str) -> String {
    if value.chars().count() <= MAX_AUDITABLE_TEXT_CHARS {
        return value.to_owned();
    }

    let kept_chars = MAX_AUDITABLE_TEXT_CHARS - TRUNCATION_MARKER.chars().count();
    let mut truncated: String = value.chars().take(kept_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Storage-assigned audit record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecordId(i64);

impl AuditRecordId {
    /// Wraps a storage identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw storage identifier.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AuditRecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Audit event captured at interception time, before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    created_at: DateTime<Utc>,
    actor: String,
    action: AuditAction,
    status: AuditStatus,
    auditable_record_text: String,
}

impl AuditRecord {
    /// Creates an audit record.
    ///
    /// A blank actor is recorded as `ANONYMOUS_ACTOR` and the auditable text
    /// is bounded with `truncate_auditable_text`.
    #[must_use]
    pub fn new(
        created_at: DateTime<Utc>,
        actor: impl Into<String>,
        action: AuditAction,
        status: AuditStatus,
        auditable_record_text: &str,
    ) -> Self {
        let actor = actor.into();
        let actor = if actor.trim().is_empty() {
            ANONYMOUS_ACTOR.to_owned()
        } else {
            actor
        };

        Self {
            created_at,
            actor,
            action,
            status,
            auditable_record_text: truncate_auditable_text(auditable_record_text),
        }
    }

    /// Returns the interception timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the attributed actor login.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.actor.as_str()
    }

    /// Returns whether the record is attributed to the anonymous sentinel.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.actor == ANONYMOUS_ACTOR
    }

    /// Returns the audited action.
    #[must_use]
    pub fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns the call outcome.
    #[must_use]
    pub fn status(&self) -> AuditStatus {
        self.status
    }

    /// Returns the bounded rendering of the affected payload.
    #[must_use]
    pub fn auditable_record_text(&self) -> &str {
        self.auditable_record_text.as_str()
    }

    /// Attaches the identifier assigned by storage.
    #[must_use]
    pub fn into_read_record(self, id: AuditRecordId) -> AuditReadRecord {
        AuditReadRecord {
            id,
            created_at: self.created_at,
            created_by: self.actor,
            action: self.action,
            status: self.status,
            auditable_record_text: self.auditable_record_text,
        }
    }
}

/// Persisted audit record as served to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReadRecord {
    id: AuditRecordId,
    created_at: DateTime<Utc>,
    created_by: String,
    action: AuditAction,
    status: AuditStatus,
    auditable_record_text: String,
}

impl AuditReadRecord {
    /// Rebuilds a read record from stored columns.
    #[must_use]
    pub fn from_storage(
        id: AuditRecordId,
        created_at: DateTime<Utc>,
        created_by: impl Into<String>,
        action: AuditAction,
        status: AuditStatus,
        auditable_record_text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            created_at,
            created_by: created_by.into(),
            action,
            status,
            auditable_record_text: auditable_record_text.into(),
        }
    }

    /// Returns the storage identifier.
    #[must_use]
    pub fn id(&self) -> AuditRecordId {
        self.id
    }

    /// Returns the interception timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the actor login the record is attributed to.
    #[must_use]
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }

    /// Returns the audited action.
    #[must_use]
    pub fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns the call outcome.
    #[must_use]
    pub fn status(&self) -> AuditStatus {
        self.status
    }

    /// Returns the bounded rendering of the affected payload.
    #[must_use]
    pub fn auditable_record_text(&self) -> &str {
        self.auditable_record_text.as_str()
    }
}
