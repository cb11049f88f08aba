//! Inventory adjustment kinds and the sign rule shared by every stock path

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Reason recorded on adjustments created by the stock increment flow
pub const STOCK_INCREMENT_REASON: &str = "Stock increment via update";

/// Reason recorded on adjustments created by a direct stock edit
pub const STOCK_CORRECTION_REASON: &str = "Stock correction via edit";

/// Reason recorded for the opening stock of a new item
pub const INITIAL_STOCK_REASON: &str = "Initial stock on item creation";

/// Kind of quantity change an adjustment records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentType {
    Addition,
    Deduction,
    Correction,
    WriteOff,
    Transfer,
}

/// Direction an adjustment moves stock in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Increase,
    Decrease,
}

impl Effect {
    pub fn sign(&self) -> Decimal {
        match self {
            Effect::Increase => Decimal::ONE,
            Effect::Decrease => Decimal::NEGATIVE_ONE,
        }
    }
}

impl AdjustmentType {
    pub const ALL: [AdjustmentType; 5] = [
        AdjustmentType::Addition,
        AdjustmentType::Deduction,
        AdjustmentType::Correction,
        AdjustmentType::WriteOff,
        AdjustmentType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Addition => "addition",
            AdjustmentType::Deduction => "deduction",
            AdjustmentType::Correction => "correction",
            AdjustmentType::WriteOff => "write-off",
            AdjustmentType::Transfer => "transfer",
        }
    }

    /// Deductions and write-offs remove stock; everything else adds it
    pub fn effect(&self) -> Effect {
        match self {
            AdjustmentType::Deduction | AdjustmentType::WriteOff => Effect::Decrease,
            AdjustmentType::Addition | AdjustmentType::Correction | AdjustmentType::Transfer => {
                Effect::Increase
            }
        }
    }

    /// Signed base-unit change for a non-negative `quantity`
    pub fn signed_quantity(&self, quantity: Decimal) -> Decimal {
        self.effect().sign() * quantity.abs()
    }

    /// Change that undoes this adjustment on deletion.
    ///
    /// Only additions and deductions are reversible; other kinds yield zero.
    pub fn reversal_delta(&self, quantity: Decimal) -> Decimal {
        match self {
            AdjustmentType::Addition | AdjustmentType::Deduction => -self.signed_quantity(quantity),
            _ => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdjustmentType {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdjustmentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| InventoryError::UnknownVariant {
                kind: "adjustment type",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for AdjustmentType {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Adjustment status; set by callers, not enforced by a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
    #[default]
    Completed,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
            AdjustmentStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for AdjustmentStatus {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AdjustmentStatus::Pending),
            "approved" => Ok(AdjustmentStatus::Approved),
            "rejected" => Ok(AdjustmentStatus::Rejected),
            "completed" => Ok(AdjustmentStatus::Completed),
            other => Err(InventoryError::UnknownVariant {
                kind: "adjustment status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for AdjustmentStatus {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
