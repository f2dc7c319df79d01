use axum::Json;
use axum::extract::{Path, Query, State};
use bazaar_application::AuditSearchQuery;
use bazaar_core::AppError;
use bazaar_domain::AuditRecordId;

use crate::dto::{AuditRecordResponse, AuditSearchParams};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_audits_handler(
    State(state): State<AppState>,
    Query(params): Query<AuditSearchParams>,
) -> ApiResult<Json<Vec<AuditRecordResponse>>> {
    let records = if params.is_unfiltered() {
        state.audit_query_service.find_all().await?
    } else {
        state
            .audit_query_service
            .search(AuditSearchQuery::try_from(params)?)
            .await?
    };

    Ok(Json(
        records
            .into_iter()
            .map(AuditRecordResponse::from)
            .collect(),
    ))
}

pub async fn get_audit_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AuditRecordResponse>> {
    let record = state
        .audit_query_service
        .find_by_id(AuditRecordId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("audit record {id}")))?;

    Ok(Json(AuditRecordResponse::from(record)))
}

pub async fn list_actor_audits_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<AuditRecordResponse>>> {
    let records = state
        .audit_query_service
        .find_all_by_actor(email.as_str())
        .await?
        .into_iter()
        .map(AuditRecordResponse::from)
        .collect();

    Ok(Json(records))
}
