//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod audit_record;
mod operation;

pub use audit::{AuditAction, AuditStatus};
pub use audit_record::{
    ANONYMOUS_ACTOR, AuditReadRecord, AuditRecord, AuditRecordId, MAX_AUDITABLE_TEXT_CHARS,
    truncate_auditable_text,
};
pub use operation::{OperationKey, OperationPolicy};
