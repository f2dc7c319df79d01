use std::sync::Arc;

use bazaar_application::{
    AuditInterceptor, AuditReader, AuditWriter, AuditedCall, FixedActorResolver,
    MonotonicAuditClock,
};
use bazaar_core::{AppError, AppResult, UserIdentity};
use bazaar_domain::{ANONYMOUS_ACTOR, AuditAction, AuditReadRecord, AuditStatus};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::{AuditSnapshot, AuditSnapshotFile, MIGRATOR, SnapshotAuditRepository};

/// Connects to `DATABASE_URL` and applies migrations; `None` skips the test.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for audit repository tests: {error}");
    }

    Some(pool)
}

/// Fresh snapshot repository backed by a unique temporary file.
pub(crate) fn temp_snapshot_repository() -> Arc<SnapshotAuditRepository> {
    Arc::new(SnapshotAuditRepository::new(
        AuditSnapshotFile::new(
            std::env::temp_dir().join(format!("bazaar-audit-{}.json", uuid::Uuid::new_v4())),
        ),
        AuditSnapshot::empty(),
    ))
}

fn interceptor<G>(gateway: Arc<G>, resolver: FixedActorResolver) -> AuditInterceptor
where
    G: AuditWriter + 'static,
{
    AuditInterceptor::new(
        gateway,
        Arc::new(resolver),
        Arc::new(MonotonicAuditClock::new()),
    )
}

/// Runs create, read and a failing delete as `actor`, then a failing login
/// without a principal. Returns the actor's records followed by the
/// anonymous login record tagged with `actor`.
pub(crate) async fn run_catalog_sequence<G>(gateway: Arc<G>, actor: &str) -> Vec<AuditReadRecord>
where
    G: AuditWriter + AuditReader + 'static,
{
    let signed_in = interceptor(
        gateway.clone(),
        FixedActorResolver::new(UserIdentity::from_email(actor)),
    );

    let created = signed_in
        .intercept(
            AuditedCall {
                operation: "products.create",
                action: AuditAction::Create,
                input_text: "name=lamp".to_owned(),
            },
            || async { Ok("lamp") },
        )
        .await;
    assert!(created.is_ok());

    let read = signed_in
        .intercept(
            AuditedCall {
                operation: "products.read",
                action: AuditAction::Read,
                input_text: "id=1".to_owned(),
            },
            || async { Ok(1_u32) },
        )
        .await;
    assert!(read.is_ok());

    let deleted: AppResult<()> = signed_in
        .intercept(
            AuditedCall {
                operation: "products.delete",
                action: AuditAction::Delete,
                input_text: "id=404".to_owned(),
            },
            || async { Err(AppError::NotFound("product 404".to_owned())) },
        )
        .await;
    assert!(deleted.is_err());

    let login_text = format!("email={actor}");
    let anonymous = interceptor(gateway.clone(), FixedActorResolver::anonymous());
    let login: AppResult<UserIdentity> = anonymous
        .intercept(
            AuditedCall {
                operation: "auth.login",
                action: AuditAction::Login,
                input_text: login_text.clone(),
            },
            || async { Err(AppError::Unauthorized("invalid credentials".to_owned())) },
        )
        .await;
    assert!(login.is_err());

    let mut records = gateway.find_all_by_actor(actor).await.unwrap_or_default();
    records.extend(
        gateway
            .find_all_by_actor(ANONYMOUS_ACTOR)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|record| record.auditable_record_text() == login_text),
    );
    records
}

/// Backend-independent view of records: everything except ids and timestamps.
pub(crate) fn comparable(
    records: &[AuditReadRecord],
) -> Vec<(String, AuditAction, AuditStatus, String)> {
    records
        .iter()
        .map(|record| {
            (
                record.created_by().to_owned(),
                record.action(),
                record.status(),
                record.auditable_record_text().to_owned(),
            )
        })
        .collect()
}
