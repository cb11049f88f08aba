//! Item quantity ledger rules
//!
//! `Item.total_quantity` is moved by adjustments, stock increments, losses and
//! sales. Each path decides whether the result may drop below zero, so the
//! floor is an explicit argument rather than a hidden clamp.

use rust_decimal::Decimal;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{AdjustmentType, ItemType, PackageGeometry};
use crate::units::{convert_quantity, Unit};

/// Whether a quantity update clamps at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPolicy {
    /// The result may go negative (manual and package adjustments)
    Unbounded,
    /// The result is clamped at zero (reversals, losses)
    AtZero,
}

/// Apply a signed `delta` to `current` under `policy`
pub fn apply_delta(current: Decimal, delta: Decimal, policy: FloorPolicy) -> Decimal {
    let next = current + delta;
    match policy {
        FloorPolicy::Unbounded => next,
        FloorPolicy::AtZero => next.max(Decimal::ZERO),
    }
}

/// New item total after applying an adjustment; never floored
pub fn apply_adjustment(
    current: Decimal,
    adjustment_type: AdjustmentType,
    quantity: Decimal,
) -> Decimal {
    apply_delta(
        current,
        adjustment_type.signed_quantity(quantity),
        FloorPolicy::Unbounded,
    )
}

/// New item total after deleting an adjustment, floored at zero.
///
/// Returns `None` when the adjustment kind is not reversible and the total
/// must stay untouched.
pub fn reverse_adjustment(
    current: Decimal,
    adjustment_type: AdjustmentType,
    quantity: Decimal,
) -> Option<Decimal> {
    let delta = adjustment_type.reversal_delta(quantity);
    if delta.is_zero() {
        return None;
    }
    Some(apply_delta(current, delta, FloorPolicy::AtZero))
}

/// Increment requested through the item update endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StockIncrement {
    pub packages: Option<Decimal>,
    pub total_weight: Option<Decimal>,
    pub total_units: Option<Decimal>,
}

/// Base-unit quantity a stock increment adds, or `None` when nothing is added.
///
/// An explicit weight (weighable) or unit count (unit-based) wins when it is
/// non-zero; otherwise the package count is converted with the item geometry.
pub fn increment_quantity(
    geometry: &PackageGeometry,
    increment: &StockIncrement,
) -> InventoryResult<Option<Decimal>> {
    for (field, value) in [
        ("increment_initial_packages", increment.packages),
        ("increment_total_weight", increment.total_weight),
        ("increment_total_units", increment.total_units),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(InventoryError::invalid(field, "Increment cannot be negative"));
        }
    }

    let explicit = match geometry.item_type() {
        ItemType::Weighable => increment.total_weight,
        ItemType::UnitBased => increment.total_units,
        ItemType::SingleUnit => None,
    }
    .filter(|v| !v.is_zero());

    let quantity = match explicit {
        Some(q) => q,
        None => geometry.packages_to_base(increment.packages.unwrap_or(Decimal::ZERO))?,
    };

    Ok((!quantity.is_zero()).then_some(quantity))
}

/// Quantity recorded on a correction adjustment for a direct stock edit
pub fn correction_quantity(
    geometry: &PackageGeometry,
    full_packages: i64,
    total_quantity: Option<Decimal>,
) -> InventoryResult<Decimal> {
    match total_quantity {
        Some(total) => Ok(total),
        None => geometry.packages_to_base(Decimal::from(full_packages)),
    }
}

/// Outcome of checking a loss against current stock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossDeduction {
    /// Loss quantity converted to the item's base unit
    pub base_quantity: Decimal,
    /// Item total after the deduction, floored at zero
    pub remaining: Decimal,
    /// `false` when the unit pair fell back to 1:1
    pub exact_conversion: bool,
}

/// Convert a loss into base units and deduct it from `current_total`.
///
/// Fails when the converted amount exceeds what is on hand.
pub fn plan_loss_deduction(
    item_name: &str,
    current_total: Decimal,
    quantity_lost: Decimal,
    unit_of_measure: Unit,
    base_unit: Unit,
    geometry: &PackageGeometry,
) -> InventoryResult<LossDeduction> {
    let conversion = convert_quantity(quantity_lost, unit_of_measure, base_unit, geometry)?;

    if conversion.quantity > current_total {
        return Err(InventoryError::InsufficientStock {
            item: item_name.to_string(),
            available: current_total,
            requested: conversion.quantity,
        });
    }

    Ok(LossDeduction {
        base_quantity: conversion.quantity,
        remaining: apply_delta(current_total, -conversion.quantity, FloorPolicy::AtZero),
        exact_conversion: conversion.exact,
    })
}

/// Item total after a deleted loss is restored; not capped
pub fn restore_loss(current_total: Decimal, base_quantity: Decimal) -> Decimal {
    apply_delta(current_total, base_quantity, FloorPolicy::Unbounded)
}
