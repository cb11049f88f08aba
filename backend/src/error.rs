//! Error handling for the Retail Inventory service
//!
//! Every failure reaches the client as `{ "error", "code", "details" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use shared::InventoryError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid request: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Invalid { field, message } => AppError::validation(field, message),
            InventoryError::InsufficientStock {
                item,
                available,
                requested,
            } => AppError::InsufficientStock {
                item,
                available,
                requested,
            },
            InventoryError::NotFound(what) => AppError::NotFound(what),
            other @ (InventoryError::QuantityOutOfRange(_)
            | InventoryError::UnknownVariant { .. }) => AppError::ValidationError(other.to_string()),
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error, details) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message.clone(),
                Some(json!({ "field": field })),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Request body failed validation".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::InsufficientStock {
                item,
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_STOCK",
                format!("Not enough stock for {}", item),
                Some(json!({
                    "item": item,
                    "available": available,
                    "requested": requested,
                })),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                "DUPLICATE_ENTRY",
                format!("A record with this {} already exists", field),
                Some(json!({ "field": field })),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                "CONFLICT",
                message.clone(),
                Some(json!({ "resource": resource })),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
                None,
            ),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                Some(Value::String(err.to_string())),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(Value::String(format!("{:#}", err))),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error,
            code: code.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
