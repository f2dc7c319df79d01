//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod orm_audit_repository;
mod orm_entities;
mod postgres_audit_repository;
mod snapshot_audit_repository;
mod task_local_actor_resolver;

#[cfg(test)]
mod test_support;

pub use orm_audit_repository::OrmAuditRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use snapshot_audit_repository::{AuditSnapshot, AuditSnapshotFile, SnapshotAuditRepository};
pub use task_local_actor_resolver::{TaskLocalActorResolver, with_principal};

/// Embedded SQL migrations for the relational and ORM audit backends.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
