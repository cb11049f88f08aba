//! HTTP handlers for item endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, Pagination};
use crate::services::items::{
    CreateItemInput, Item, ItemSearch, ItemService, ItemUpdateResult, UpdateItemInput,
};
use crate::AppState;

fn item_service(state: &AppState) -> ItemService {
    ItemService::new(state.db.clone(), state.config.inventory.clone())
}

/// Create an item, optionally with opening stock
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = item_service(&state).create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List items with optional name/SKU search
pub async fn list_items(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(search): Query<ItemSearch>,
) -> AppResult<Json<PaginatedResponse<Item>>> {
    let items = item_service(&state)
        .list_items(&pagination, &search)
        .await?;
    Ok(Json(items))
}

/// List items at or below their minimum stock
pub async fn list_low_stock_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = item_service(&state).list_low_stock().await?;
    Ok(Json(items))
}

/// Get an item by ID
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    let item = item_service(&state).get_item(item_id).await?;
    Ok(Json(item))
}

/// Update an item; package increments are recorded as an addition
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<ItemUpdateResult>> {
    let result = item_service(&state).update_item(item_id, input).await?;
    Ok(Json(result))
}

/// Delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    item_service(&state).delete_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
