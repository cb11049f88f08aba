//! Domain errors raised by the inventory accounting rules

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a pure inventory rule (no I/O involved)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Quantity {0} is out of range")]
    QuantityOutOfRange(Decimal),

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl InventoryError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        InventoryError::Invalid {
            field,
            message: message.into(),
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
