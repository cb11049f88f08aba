//! HTTP handlers for item loss endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, Pagination};
use crate::services::losses::{ItemLoss, LossFilter, LossReversal, LossService, RecordLossInput};
use crate::AppState;

/// Record a loss against an item
pub async fn record_loss(
    State(state): State<AppState>,
    Json(input): Json<RecordLossInput>,
) -> AppResult<(StatusCode, Json<ItemLoss>)> {
    let service = LossService::new(state.db);
    let loss = service.record_loss(input).await?;
    Ok((StatusCode::CREATED, Json(loss)))
}

/// List losses
pub async fn list_losses(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<LossFilter>,
) -> AppResult<Json<PaginatedResponse<ItemLoss>>> {
    let service = LossService::new(state.db);
    let losses = service.list_losses(&filter, &pagination).await?;
    Ok(Json(losses))
}

/// Get a loss by ID
pub async fn get_loss(
    State(state): State<AppState>,
    Path(loss_id): Path<Uuid>,
) -> AppResult<Json<ItemLoss>> {
    let service = LossService::new(state.db);
    let loss = service.get_loss(loss_id).await?;
    Ok(Json(loss))
}

/// Delete a loss and restore the item's stock
pub async fn delete_loss(
    State(state): State<AppState>,
    Path(loss_id): Path<Uuid>,
) -> AppResult<Json<LossReversal>> {
    let service = LossService::new(state.db);
    let reversal = service.delete_loss(loss_id).await?;
    Ok(Json(reversal))
}
