//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, Pagination};
use crate::services::sales::{CreateSaleInput, Sale, SaleService, SaleWithItems};
use crate::AppState;

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SaleWithItems>)> {
    let service = SaleService::new(state.db);
    let sale = service.create_sale(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service.list_sales(&pagination).await?;
    Ok(Json(sales))
}

/// Get a sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Delete a sale and put its quantities back in stock
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = SaleService::new(state.db);
    service.delete_sale(sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
