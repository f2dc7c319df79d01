//! Registration table selecting which interceptors wrap which operation.
//!
//! The table is consulted once, when an operation is bound at assembly time.
//! Invocations of a bound operation never look it up again.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use bazaar_core::{AppError, AppResult, NonEmptyString};
use bazaar_domain::{AuditAction, OperationKey, OperationPolicy};

use crate::audit_interceptor::{AuditInterceptor, AuditedCall};
use crate::performance_interceptor::PerformanceInterceptor;

#[derive(Debug, Clone, Copy)]
enum Marker {
    Audited(AuditAction),
    Timed,
}

/// Builder collecting audit and timing registrations.
#[derive(Debug, Default)]
pub struct OperationRegistryBuilder {
    markers: Vec<(String, String, Marker)>,
    timed_services: Vec<String>,
}

impl OperationRegistryBuilder {
    /// Audits `service.operation` with the given action.
    #[must_use]
    pub fn audited(
        mut self,
        service: impl Into<String>,
        operation: impl Into<String>,
        action: AuditAction,
    ) -> Self {
        self.markers
            .push((service.into(), operation.into(), Marker::Audited(action)));
        self
    }

    /// Times `service.operation`.
    #[must_use]
    pub fn timed(mut self, service: impl Into<String>, operation: impl Into<String>) -> Self {
        self.markers
            .push((service.into(), operation.into(), Marker::Timed));
        self
    }

    /// Times every operation of `service`.
    #[must_use]
    pub fn timed_service(mut self, service: impl Into<String>) -> Self {
        self.timed_services.push(service.into());
        self
    }

    /// Validates the registrations and builds the table.
    pub fn build(self) -> AppResult<OperationRegistry> {
        let mut operations: HashMap<OperationKey, OperationPolicy> = HashMap::new();

        for (service, operation, marker) in self.markers {
            let key = OperationKey::new(service, operation)?;
            let policy = operations.entry(key.clone()).or_default();

            match marker {
                Marker::Audited(action) => match policy.audit_action {
                    Some(existing) if existing != action => {
                        return Err(AppError::Conflict(format!(
                            "operation '{key}' is already audited as '{existing}', cannot register '{action}'"
                        )));
                    }
                    _ => policy.audit_action = Some(action),
                },
                Marker::Timed => policy.timed = true,
            }
        }

        let timed_services = self
            .timed_services
            .into_iter()
            .map(|service| NonEmptyString::for_field("service", service).map(String::from))
            .collect::<AppResult<HashSet<_>>>()?;

        Ok(OperationRegistry {
            operations,
            timed_services,
        })
    }
}

/// Validated registration table.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<OperationKey, OperationPolicy>,
    timed_services: HashSet<String>,
}

impl OperationRegistry {
    /// Starts a new registration table.
    #[must_use]
    pub fn builder() -> OperationRegistryBuilder {
        OperationRegistryBuilder::default()
    }

    /// Returns the policy for one operation; unregistered operations pass through.
    #[must_use]
    pub fn policy_for(&self, key: &OperationKey) -> OperationPolicy {
        let mut policy = self.operations.get(key).copied().unwrap_or_default();
        if self.timed_services.contains(key.service()) {
            policy.timed = true;
        }

        policy
    }
}

/// Applies registered interceptors to operations bound at assembly time.
#[derive(Clone)]
pub struct OperationDispatcher {
    registry: Arc<OperationRegistry>,
    audit_interceptor: AuditInterceptor,
    performance_interceptor: PerformanceInterceptor,
}

impl OperationDispatcher {
    /// Creates a dispatcher over a registration table.
    #[must_use]
    pub fn new(
        registry: OperationRegistry,
        audit_interceptor: AuditInterceptor,
        performance_interceptor: PerformanceInterceptor,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            audit_interceptor,
            performance_interceptor,
        }
    }

    /// Resolves the policy of `service.operation` once and returns a callable handle.
    pub fn bind(
        &self,
        service: impl Into<String>,
        operation: impl Into<String>,
    ) -> AppResult<BoundOperation> {
        let key = OperationKey::new(service, operation)?;
        let policy = self.registry.policy_for(&key);

        Ok(BoundOperation {
            label: key.to_string(),
            policy,
            audit_interceptor: self.audit_interceptor.clone(),
            performance_interceptor: self.performance_interceptor.clone(),
        })
    }
}

/// Operation with its interceptors resolved.
///
/// Audit wraps timing, so the emitted duration covers the business call only.
#[derive(Clone)]
pub struct BoundOperation {
    label: String,
    policy: OperationPolicy,
    audit_interceptor: AuditInterceptor,
    performance_interceptor: PerformanceInterceptor,
}

impl BoundOperation {
    /// Returns the `service.operation` label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Invokes the operation, rendering a successful result with `Debug` for audit.
    pub async fn invoke<T, F, Fut>(&self, input_text: impl Into<String>, call: F) -> AppResult<T>
    where
        T: Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.invoke_with(input_text, call, |value| format!("{value:?}"))
            .await
    }

    /// Invokes the operation, rendering a successful result with `describe` for audit.
    pub async fn invoke_with<T, F, Fut, D>(
        &self,
        input_text: impl Into<String>,
        call: F,
        describe: D,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
        D: FnOnce(&T) -> String,
    {
        let label = self.label();
        let timed = self.policy.timed;
        let performance_interceptor = &self.performance_interceptor;
        let timed_call = move || async move {
            if timed {
                performance_interceptor.time_result(label, call).await
            } else {
                call().await
            }
        };

        match self.policy.audit_action {
            Some(action) => {
                self.audit_interceptor
                    .intercept_with(
                        AuditedCall {
                            operation: label,
                            action,
                            input_text: input_text.into(),
                        },
                        timed_call,
                        describe,
                    )
                    .await
            }
            None => timed_call().await,
        }
    }
}

#[cfg(test)]
mod tests;
