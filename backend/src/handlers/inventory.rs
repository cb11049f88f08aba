//! HTTP handlers for package stock and inventory adjustments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, Pagination};
use crate::services::inventory::{
    AdjustmentFilter, AdjustmentOutcome, AdjustmentReversal, AdjustmentWithItem,
    CorrectStockInput, CreateAdjustmentInput, InventoryService, InventoryStock,
    InventoryStockView, StockQuery,
};
use crate::AppState;

fn inventory_service(state: &AppState) -> InventoryService {
    InventoryService::new(state.db.clone(), state.config.inventory.clone())
}

/// Get the package stock record for an item
pub async fn get_inventory_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<InventoryStockView>> {
    let stock = inventory_service(&state).get_stock(query.item_id).await?;
    Ok(Json(stock))
}

/// Overwrite the full package count of an item
pub async fn correct_inventory_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<CorrectStockInput>,
) -> AppResult<Json<InventoryStock>> {
    let stock = inventory_service(&state)
        .correct_stock(item_id, input)
        .await?;
    Ok(Json(stock))
}

/// Rebuild package stock from the item's running total
pub async fn reconcile_inventory_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryStock>> {
    let stock = inventory_service(&state).reconcile_stock(item_id).await?;
    Ok(Json(stock))
}

/// Record a manual adjustment
pub async fn create_adjustment(
    State(state): State<AppState>,
    Json(input): Json<CreateAdjustmentInput>,
) -> AppResult<(StatusCode, Json<AdjustmentOutcome>)> {
    let outcome = inventory_service(&state).create_adjustment(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// List adjustments
pub async fn list_adjustments(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<AdjustmentFilter>,
) -> AppResult<Json<PaginatedResponse<AdjustmentWithItem>>> {
    let adjustments = inventory_service(&state)
        .list_adjustments(&filter, &pagination)
        .await?;
    Ok(Json(adjustments))
}

/// Get an adjustment by ID
pub async fn get_adjustment(
    State(state): State<AppState>,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<AdjustmentWithItem>> {
    let adjustment = inventory_service(&state)
        .get_adjustment(adjustment_id)
        .await?;
    Ok(Json(adjustment))
}

/// Delete an adjustment and undo its effect on the item total
pub async fn delete_adjustment(
    State(state): State<AppState>,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<AdjustmentReversal>> {
    let reversal = inventory_service(&state)
        .delete_adjustment(adjustment_id)
        .await?;
    Ok(Json(reversal))
}
