use std::sync::Arc;

use bazaar_application::{
    AuditInterceptor, AuditReader, MonotonicAuditClock, OperationDispatcher,
    PerformanceInterceptor,
};
use bazaar_core::{AppError, UserIdentity};
use bazaar_domain::{ANONYMOUS_ACTOR, AuditAction, AuditStatus, OperationKey};
use bazaar_infrastructure::{
    AuditSnapshot, AuditSnapshotFile, SnapshotAuditRepository, TaskLocalActorResolver,
    with_principal,
};

use super::{CatalogService, LoginService, operation_registry};

fn dispatcher_over(repository: Arc<SnapshotAuditRepository>) -> OperationDispatcher {
    let Ok(registry) = operation_registry() else {
        panic!("operation registry should build");
    };

    OperationDispatcher::new(
        registry,
        AuditInterceptor::new(
            repository,
            Arc::new(TaskLocalActorResolver::new()),
            Arc::new(MonotonicAuditClock::new()),
        ),
        PerformanceInterceptor::new(),
    )
}

fn in_memory_repository() -> Arc<SnapshotAuditRepository> {
    Arc::new(SnapshotAuditRepository::new(
        AuditSnapshotFile::new(
            std::env::temp_dir().join(format!("bazaar-catalog-{}.json", uuid::Uuid::new_v4())),
        ),
        AuditSnapshot::empty(),
    ))
}

#[test]
fn registry_audits_every_product_operation_and_times_the_service() {
    let Ok(registry) = operation_registry() else {
        panic!("operation registry should build");
    };

    for (operation, action) in [
        ("create", AuditAction::Create),
        ("read", AuditAction::Read),
        ("update", AuditAction::Update),
        ("delete", AuditAction::Delete),
    ] {
        let Ok(key) = OperationKey::new("products", operation) else {
            panic!("valid key");
        };
        let policy = registry.policy_for(&key);
        assert_eq!(policy.audit_action, Some(action));
        assert!(policy.timed);
    }

    let Ok(login) = OperationKey::new("auth", "login") else {
        panic!("valid key");
    };
    let policy = registry.policy_for(&login);
    assert_eq!(policy.audit_action, Some(AuditAction::Login));
    assert!(policy.timed);
}

#[tokio::test]
async fn product_lifecycle_is_attributed_to_bound_principal() {
    let repository = in_memory_repository();
    let dispatcher = dispatcher_over(repository.clone());
    let Ok(catalog) = CatalogService::new(&dispatcher) else {
        panic!("catalog should bind");
    };

    let outcome = with_principal(UserIdentity::from_email("admin@admin.ru"), async {
        let created = catalog.create("Desk lamp".to_owned(), 2_500).await?;
        let updated = catalog
            .update(created.id, "Desk lamp XL".to_owned(), 3_100)
            .await?;
        let read = catalog.find(created.id).await?;
        catalog.delete(created.id).await?;
        Ok::<_, AppError>((updated, read))
    })
    .await;

    let (updated, read) = match outcome {
        Ok(products) => products,
        Err(error) => panic!("lifecycle should succeed: {error}"),
    };
    assert_eq!(updated, read);
    assert_eq!(read.price_cents, 3_100);

    let records = repository
        .find_all_by_actor("admin@admin.ru")
        .await
        .unwrap_or_default();
    let actions: Vec<AuditAction> = records.iter().map(|record| record.action()).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Read,
            AuditAction::Delete,
        ]
    );
    assert!(
        records
            .iter()
            .all(|record| record.status() == AuditStatus::Success)
    );
    assert!(records[0].auditable_record_text().contains("Desk lamp"));
}

#[tokio::test]
async fn missing_product_delete_fails_and_is_audited() {
    let repository = in_memory_repository();
    let dispatcher = dispatcher_over(repository.clone());
    let Ok(catalog) = CatalogService::new(&dispatcher) else {
        panic!("catalog should bind");
    };

    let deleted = with_principal(
        UserIdentity::from_email("admin@admin.ru"),
        catalog.delete(404),
    )
    .await;

    assert_eq!(deleted, Err(AppError::NotFound("product 404".to_owned())));
    let records = repository.find_all().await.unwrap_or_default();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action(), AuditAction::Delete);
    assert_eq!(records[0].status(), AuditStatus::Failure);
    assert_eq!(records[0].auditable_record_text(), "id=404");
}

#[tokio::test]
async fn invalid_draft_is_rejected_inside_the_audited_call() {
    let repository = in_memory_repository();
    let dispatcher = dispatcher_over(repository.clone());
    let Ok(catalog) = CatalogService::new(&dispatcher) else {
        panic!("catalog should bind");
    };

    let created = catalog.create("  ".to_owned(), -1).await;

    assert!(matches!(created, Err(AppError::Validation(_))));
    let records = repository.find_all().await.unwrap_or_default();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].created_by(), ANONYMOUS_ACTOR);
    assert_eq!(records[0].status(), AuditStatus::Failure);
}

#[tokio::test]
async fn failed_anonymous_login_is_audited_without_credentials() {
    let repository = in_memory_repository();
    let dispatcher = dispatcher_over(repository.clone());
    let Ok(login) = LoginService::new(
        &dispatcher,
        "admin@admin.ru".to_owned(),
        Some("correct horse".to_owned()),
    ) else {
        panic!("login should bind");
    };

    let rejected = login
        .login("admin@admin.ru".to_owned(), "wrong".to_owned())
        .await;
    let accepted = login
        .login("ADMIN@admin.ru".to_owned(), "correct horse".to_owned())
        .await;

    assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
    assert_eq!(
        accepted.as_ref().map(UserIdentity::login),
        Ok("admin@admin.ru")
    );

    let records = repository
        .find_all_by_actor(ANONYMOUS_ACTOR)
        .await
        .unwrap_or_default();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action(), AuditAction::Login);
    assert_eq!(records[0].status(), AuditStatus::Failure);
    assert_eq!(records[0].auditable_record_text(), "email=admin@admin.ru");
    assert_eq!(records[1].status(), AuditStatus::Success);
    assert_eq!(records[1].auditable_record_text(), "login=admin@admin.ru");
    assert!(
        records
            .iter()
            .all(|record| !record.auditable_record_text().contains("correct horse"))
    );
}

#[tokio::test]
async fn login_without_configured_password_always_fails() {
    let repository = in_memory_repository();
    let dispatcher = dispatcher_over(repository);
    let Ok(login) = LoginService::new(&dispatcher, "admin@admin.ru".to_owned(), None) else {
        panic!("login should bind");
    };

    let rejected = login.login("admin@admin.ru".to_owned(), String::new()).await;

    assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
}
