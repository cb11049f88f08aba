//! Route definitions for the Retail Inventory API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/items", item_routes())
        .nest("/inventory-stock", stock_routes())
        .nest("/inventory-adjustments", adjustment_routes())
        .nest("/item-losses", loss_routes())
        .nest("/sales", sale_routes())
}

/// Item catalogue routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/low-stock", get(handlers::list_low_stock_items))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
}

/// Package stock routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_inventory_stock))
        .route("/:item_id", put(handlers::correct_inventory_stock))
        .route(
            "/:item_id/reconcile",
            post(handlers::reconcile_inventory_stock),
        )
}

/// Manual adjustment routes
fn adjustment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_adjustments).post(handlers::create_adjustment),
        )
        .route(
            "/:adjustment_id",
            get(handlers::get_adjustment).delete(handlers::delete_adjustment),
        )
}

/// Loss routes
fn loss_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_losses).post(handlers::record_loss))
        .route(
            "/:loss_id",
            get(handlers::get_loss).delete(handlers::delete_loss),
        )
}

/// Sale routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale).delete(handlers::delete_sale),
        )
}
