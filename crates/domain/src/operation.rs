use std::fmt::{Display, Formatter};

use bazaar_core::{AppResult, NonEmptyString};

use crate::AuditAction;

/// Identifies one operation of one service, e.g. `products` / `create`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    service: NonEmptyString,
    operation: NonEmptyString,
}

impl OperationKey {
    /// Creates a validated operation key.
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            service: NonEmptyString::for_field("service", service)?,
            operation: NonEmptyString::for_field("operation", operation)?,
        })
    }

    /// Returns the owning service name.
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }
}

impl Display for OperationKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.service, self.operation)
    }
}

/// Cross-cutting behavior selected for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationPolicy {
    /// Audit classification, when the operation is audited.
    pub audit_action: Option<AuditAction>,
    /// Whether wall-clock timing is emitted for the operation.
    pub timed: bool,
}

impl OperationPolicy {
    /// Returns whether neither auditing nor timing applies.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.audit_action.is_none() && !self.timed
    }
}
