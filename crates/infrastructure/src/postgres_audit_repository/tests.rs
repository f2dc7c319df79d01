use std::sync::Arc;

use bazaar_application::{AuditReader, AuditSearchQuery, AuditWriter};
use bazaar_core::AppError;
use bazaar_domain::{AuditAction, AuditRecord, AuditRecordId, AuditStatus};
use chrono::Utc;

use super::PostgresAuditRepository;
use crate::test_support::{comparable, run_catalog_sequence, temp_snapshot_repository, test_pool};

fn unique_actor() -> String {
    format!("{}@audit.test", uuid::Uuid::new_v4())
}

#[tokio::test]
async fn appended_record_is_readable_by_id_and_actor() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditRepository::new(pool);
    let actor = unique_actor();

    let appended = repository
        .append(AuditRecord::new(
            Utc::now(),
            actor.as_str(),
            AuditAction::Create,
            AuditStatus::Success,
            "Product { name: \"lamp\" }",
        ))
        .await;
    let id = match appended {
        Ok(id) => id,
        Err(error) => panic!("append should succeed: {error}"),
    };

    let first = repository.find_by_id(id).await;
    let second = repository.find_by_id(id).await;
    assert!(first.as_ref().is_ok_and(Option::is_some));
    assert_eq!(first, second);

    let listed = repository
        .find_all_by_actor(actor.as_str())
        .await
        .unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].created_by(), actor);
    assert_eq!(listed[0].action(), AuditAction::Create);
}

#[tokio::test]
async fn unknown_id_is_none_not_error() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditRepository::new(pool);

    let missing = repository.find_by_id(AuditRecordId::new(i64::MAX)).await;

    assert_eq!(missing, Ok(None));
}

#[tokio::test]
async fn search_filters_by_actor_and_status() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditRepository::new(pool);
    let actor = unique_actor();

    for status in [
        AuditStatus::Success,
        AuditStatus::Failure,
        AuditStatus::Failure,
    ] {
        let appended = repository
            .append(AuditRecord::new(
                Utc::now(),
                actor.as_str(),
                AuditAction::Delete,
                status,
                "product id=1",
            ))
            .await;
        assert!(appended.is_ok());
    }

    let failures = repository
        .search(AuditSearchQuery {
            actor: Some(actor.clone()),
            status: Some(AuditStatus::Failure),
            ..AuditSearchQuery::default()
        })
        .await
        .unwrap_or_default();

    assert_eq!(failures.len(), 2);
    assert!(
        failures
            .iter()
            .all(|record| record.status() == AuditStatus::Failure)
    );
}

#[tokio::test]
async fn closed_pool_surfaces_unavailable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    pool.close().await;
    let repository = PostgresAuditRepository::new(pool);

    let listed = repository.find_all().await;

    assert!(matches!(listed, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn snapshot_and_relational_backends_are_read_equivalent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let actor = unique_actor();
    let relational = Arc::new(PostgresAuditRepository::new(pool));
    let snapshot = temp_snapshot_repository();

    let relational_records = run_catalog_sequence(relational.clone(), actor.as_str()).await;
    let snapshot_records = run_catalog_sequence(snapshot.clone(), actor.as_str()).await;

    assert_eq!(relational_records.len(), 4);
    assert_eq!(
        comparable(&relational_records),
        comparable(&snapshot_records)
    );
}
