use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::AppResult;
use bazaar_domain::{AuditAction, AuditRecord, AuditStatus};
use tracing::{debug, warn};

use crate::actor_resolver::{ActorResolver, resolve_actor};
use crate::audit_clock::AuditClock;
use crate::audit_ports::AuditWriter;

/// Upper bound for one audit write before it is abandoned.
pub const DEFAULT_AUDIT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Description of the call being audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditedCall<'a> {
    /// Operation label used in diagnostics, e.g. `products.create`.
    pub operation: &'a str,
    /// Audit classification of the call.
    pub action: AuditAction,
    /// Rendering of the call input, recorded when the call fails.
    pub input_text: String,
}

/// Wraps business calls and records one audit record per call.
///
/// The wrapped call's result is always returned unchanged. Audit write
/// failures and timeouts are logged and never reach the caller.
#[derive(Clone)]
pub struct AuditInterceptor {
    writer: Arc<dyn AuditWriter>,
    actor_resolver: Arc<dyn ActorResolver>,
    clock: Arc<dyn AuditClock>,
    write_timeout: Duration,
}

impl AuditInterceptor {
    /// Creates an interceptor writing through the provided port.
    #[must_use]
    pub fn new(
        writer: Arc<dyn AuditWriter>,
        actor_resolver: Arc<dyn ActorResolver>,
        clock: Arc<dyn AuditClock>,
    ) -> Self {
        Self {
            writer,
            actor_resolver,
            clock,
            write_timeout: DEFAULT_AUDIT_WRITE_TIMEOUT,
        }
    }

    /// Overrides the audit write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Runs `operation` and audits it, rendering a successful result with `Debug`.
    pub async fn intercept<T, F, Fut>(&self, call: AuditedCall<'_>, operation: F) -> AppResult<T>
    where
        T: Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.intercept_with(call, operation, |value| format!("{value:?}"))
            .await
    }

    /// Runs `operation` and audits it, rendering a successful result with `describe`.
    pub async fn intercept_with<T, F, Fut, D>(
        &self,
        call: AuditedCall<'_>,
        operation: F,
        describe: D,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
        D: FnOnce(&T) -> String,
    {
        let actor = resolve_actor(self.actor_resolver.as_ref());
        let created_at = self.clock.now();

        let outcome = operation().await;

        let status = AuditStatus::from_outcome(outcome.is_ok());
        let auditable_text = match &outcome {
            Ok(value) => describe(value),
            Err(_) => call.input_text,
        };
        let record = AuditRecord::new(
            created_at,
            actor,
            call.action,
            status,
            auditable_text.as_str(),
        );

        // Detached write: dropping the caller's future does not cancel it.
        let persisted = tokio::spawn(persist(
            Arc::clone(&self.writer),
            self.write_timeout,
            call.operation.to_owned(),
            record,
        ));
        if let Err(error) = persisted.await {
            warn!(
                operation = call.operation,
                error = %error,
                "audit write task did not complete"
            );
        }

        outcome
    }
}

async fn persist(
    writer: Arc<dyn AuditWriter>,
    write_timeout: Duration,
    operation: String,
    record: AuditRecord,
) {
    let action = record.action();
    let status = record.status();
    let actor = record.actor().to_owned();

    match tokio::time::timeout(write_timeout, writer.append(record)).await {
        Ok(Ok(record_id)) => {
            debug!(
                operation,
                record_id = %record_id,
                action = %action,
                status = %status,
                actor = %actor,
                "audit record persisted"
            );
        }
        Ok(Err(error)) => {
            warn!(
                operation,
                action = %action,
                status = %status,
                actor = %actor,
                error = %error,
                "failed to persist audit record"
            );
        }
        Err(_) => {
            warn!(
                operation,
                action = %action,
                status = %status,
                actor = %actor,
                timeout_ms = u64::try_from(write_timeout.as_millis()).unwrap_or(u64::MAX),
                "audit record write timed out"
            );
        }
    }
}
