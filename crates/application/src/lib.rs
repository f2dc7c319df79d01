//! Application services and ports.

#![forbid(unsafe_code)]

mod actor_resolver;
mod audit_clock;
mod audit_interceptor;
mod audit_ports;
mod audit_query_service;
mod operation_registry;
mod performance_interceptor;

#[cfg(test)]
mod test_support;

pub use actor_resolver::{ActorResolver, FixedActorResolver, resolve_actor};
pub use audit_clock::{AuditClock, MonotonicAuditClock};
pub use audit_interceptor::{AuditInterceptor, AuditedCall, DEFAULT_AUDIT_WRITE_TIMEOUT};
pub use audit_ports::{AuditGateway, AuditReader, AuditSearchQuery, AuditWriter};
pub use audit_query_service::AuditQueryService;
pub use operation_registry::{
    BoundOperation, OperationDispatcher, OperationRegistry, OperationRegistryBuilder,
};
pub use performance_interceptor::PerformanceInterceptor;
