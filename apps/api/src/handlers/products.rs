use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::{ProductRequest, ProductResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .catalog_service
        .create(payload.name, payload.price_cents)
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state.catalog_service.find(id).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .update(id, payload.name, payload.price_cents)
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state.catalog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
