use std::sync::Arc;

use bazaar_core::{AppError, AppResult, UserIdentity};
use bazaar_domain::{AuditAction, AuditStatus, OperationKey};

use crate::test_support::{FakeAuditGateway, interceptor_for};
use crate::{OperationDispatcher, OperationRegistry, PerformanceInterceptor};

fn key(service: &str, operation: &str) -> OperationKey {
    match OperationKey::new(service, operation) {
        Ok(key) => key,
        Err(error) => panic!("invalid operation key in test: {error}"),
    }
}

fn catalog_registry() -> OperationRegistry {
    let registry = OperationRegistry::builder()
        .audited("products", "create", AuditAction::Create)
        .audited("products", "delete", AuditAction::Delete)
        .timed_service("products")
        .audited("auth", "login", AuditAction::Login)
        .timed("auth", "login")
        .build();

    match registry {
        Ok(registry) => registry,
        Err(error) => panic!("catalog registry should build: {error}"),
    }
}

fn dispatcher(gateway: Arc<FakeAuditGateway>) -> OperationDispatcher {
    OperationDispatcher::new(
        catalog_registry(),
        interceptor_for(gateway, Some(UserIdentity::from_email("admin@admin.ru"))),
        PerformanceInterceptor::new(),
    )
}

#[test]
fn service_level_timing_applies_to_every_operation() {
    let registry = catalog_registry();

    let create = registry.policy_for(&key("products", "create"));
    let list = registry.policy_for(&key("products", "list"));

    assert_eq!(create.audit_action, Some(AuditAction::Create));
    assert!(create.timed);
    assert_eq!(list.audit_action, None);
    assert!(list.timed);
}

#[test]
fn unregistered_operation_passes_through() {
    let registry = catalog_registry();
    assert!(registry.policy_for(&key("orders", "create")).is_passthrough());
}

#[test]
fn conflicting_audit_actions_are_rejected() {
    let registry = OperationRegistry::builder()
        .audited("products", "save", AuditAction::Create)
        .audited("products", "save", AuditAction::Update)
        .build();

    assert!(matches!(registry, Err(AppError::Conflict(_))));
}

#[test]
fn repeated_identical_registration_is_accepted() {
    let registry = OperationRegistry::builder()
        .audited("products", "save", AuditAction::Update)
        .audited("products", "save", AuditAction::Update)
        .build();

    assert!(registry.is_ok());
}

#[test]
fn blank_service_names_are_rejected() {
    assert!(OperationRegistry::builder().timed_service(" ").build().is_err());
    assert!(
        OperationRegistry::builder()
            .audited("", "create", AuditAction::Create)
            .build()
            .is_err()
    );
}

#[tokio::test]
async fn bound_audited_operation_records_one_entry() {
    let gateway = Arc::new(FakeAuditGateway::default());
    let dispatcher = dispatcher(gateway.clone());
    let Ok(create) = dispatcher.bind("products", "create") else {
        panic!("products.create should bind");
    };

    assert_eq!(create.label(), "products.create");
    let created = create.invoke("name=lamp", || async { Ok(7_u64) }).await;

    assert_eq!(created, Ok(7));
    let stored = gateway.stored().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].action(), AuditAction::Create);
    assert_eq!(stored[0].status(), AuditStatus::Success);
}

#[tokio::test]
async fn bound_delete_failure_keeps_error_and_audits_failure() {
    let gateway = Arc::new(FakeAuditGateway::default());
    let dispatcher = dispatcher(gateway.clone());
    let Ok(delete) = dispatcher.bind("products", "delete") else {
        panic!("products.delete should bind");
    };

    let deleted: AppResult<()> = delete
        .invoke("id=404", || async {
            Err(AppError::NotFound("product 404".to_owned()))
        })
        .await;

    assert_eq!(deleted, Err(AppError::NotFound("product 404".to_owned())));
    let stored = gateway.stored().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status(), AuditStatus::Failure);
    assert_eq!(stored[0].auditable_record_text(), "id=404");
}

#[tokio::test]
async fn timed_only_operation_is_not_audited() {
    let gateway = Arc::new(FakeAuditGateway::default());
    let dispatcher = dispatcher(gateway.clone());
    let Ok(list) = dispatcher.bind("products", "list") else {
        panic!("products.list should bind");
    };

    let listed = list
        .invoke("all", || async { Ok(vec!["lamp", "desk"]) })
        .await;

    assert_eq!(listed.map(|items| items.len()), Ok(2));
    assert!(gateway.stored().await.is_empty());
}
