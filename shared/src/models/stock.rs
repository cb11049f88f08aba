//! Package-aware stock levels

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PackageGeometry;
use crate::error::{InventoryError, InventoryResult};

/// Stock expressed as whole packages plus a remainder below one package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockLevel {
    pub full_packages: i64,
    pub partial_quantity: Decimal,
}

impl StockLevel {
    pub const EMPTY: StockLevel = StockLevel {
        full_packages: 0,
        partial_quantity: Decimal::ZERO,
    };

    pub fn new(full_packages: i64, partial_quantity: Decimal) -> Self {
        Self {
            full_packages,
            partial_quantity,
        }
    }

    /// Total quantity in base units
    pub fn total_quantity(&self, geometry: &PackageGeometry) -> InventoryResult<Decimal> {
        geometry
            .packages_to_base(Decimal::from(self.full_packages))?
            .checked_add(self.partial_quantity)
            .ok_or(InventoryError::QuantityOutOfRange(self.partial_quantity))
    }

    /// Split a base-unit total into packages and remainder.
    ///
    /// The remainder always satisfies `0 <= partial < per_package`, negative
    /// totals included (the package count goes negative instead).
    pub fn from_total(total: Decimal, geometry: &PackageGeometry) -> InventoryResult<Self> {
        let per_package = geometry.per_package();
        let out_of_range = InventoryError::QuantityOutOfRange(total);
        let full = total
            .checked_div(per_package)
            .ok_or_else(|| out_of_range.clone())?
            .floor();
        let partial = full
            .checked_mul(per_package)
            .and_then(|whole| total.checked_sub(whole))
            .ok_or_else(|| out_of_range.clone())?;
        let full_packages = full
            .to_i64()
            .ok_or(out_of_range)?;

        Ok(Self {
            full_packages,
            partial_quantity: partial.normalize(),
        })
    }

    /// Re-split after adding a signed base-unit `factor`
    pub fn adjusted_by(&self, factor: Decimal, geometry: &PackageGeometry) -> InventoryResult<Self> {
        let total = self
            .total_quantity(geometry)?
            .checked_add(factor)
            .ok_or(InventoryError::QuantityOutOfRange(factor))?;
        Self::from_total(total, geometry)
    }
}

/// Price used to value stock on hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationBasis {
    #[default]
    SellingPrice,
    PurchasePrice,
}

impl ValuationBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationBasis::SellingPrice => "selling_price",
            ValuationBasis::PurchasePrice => "purchase_price",
        }
    }
}

/// Value of `total_quantity` base units at `unit_price`
pub fn stock_value(total_quantity: Decimal, unit_price: Decimal) -> InventoryResult<Decimal> {
    total_quantity
        .checked_mul(unit_price)
        .map(|value| value.round_dp(2))
        .ok_or(InventoryError::QuantityOutOfRange(total_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn rice() -> PackageGeometry {
        PackageGeometry::new(ItemType::Weighable, Some(dec("50")), None).unwrap()
    }

    #[test]
    fn total_combines_packages_and_partial() {
        let level = StockLevel::new(2, dec("10"));
        assert_eq!(level.total_quantity(&rice()).unwrap(), dec("110"));
    }

    #[test]
    fn addition_keeps_full_packages_when_under_one_package() {
        let level = StockLevel::new(2, dec("10")).adjusted_by(dec("25"), &rice()).unwrap();
        assert_eq!(level, StockLevel::new(2, dec("35")));
    }

    #[test]
    fn addition_rolls_over_into_packages() {
        let level = StockLevel::new(2, dec("35")).adjusted_by(dec("70"), &rice()).unwrap();
        assert_eq!(level.full_packages, 4);
        assert_eq!(level.partial_quantity, dec("5"));
    }

    #[test]
    fn deduction_breaks_open_a_package() {
        let level = StockLevel::new(2, dec("10")).adjusted_by(dec("-20"), &rice()).unwrap();
        assert_eq!(level.full_packages, 1);
        assert_eq!(level.partial_quantity, dec("40"));
    }

    #[test]
    fn negative_total_keeps_partial_in_range() {
        let level = StockLevel::new(0, dec("10")).adjusted_by(dec("-30"), &rice()).unwrap();
        assert_eq!(level.full_packages, -1);
        assert_eq!(level.partial_quantity, dec("30"));
        assert_eq!(level.total_quantity(&rice()).unwrap(), dec("-20"));
    }

    #[test]
    fn oversized_adjustment_is_out_of_range() {
        let result = StockLevel::new(2, dec("10")).adjusted_by(Decimal::MAX, &rice());
        assert!(matches!(result, Err(InventoryError::QuantityOutOfRange(_))));
    }

    #[test]
    fn single_unit_counts_packages_directly() {
        let g = PackageGeometry::single_unit();
        let level = StockLevel::new(7, Decimal::ZERO).adjusted_by(dec("-3"), &g).unwrap();
        assert_eq!(level, StockLevel::new(4, Decimal::ZERO));
        assert_eq!(level.total_quantity(&g).unwrap(), dec("4"));
    }

    #[test]
    fn unit_based_split() {
        let g = PackageGeometry::new(ItemType::UnitBased, None, Some(12)).unwrap();
        let level = StockLevel::from_total(dec("30"), &g).unwrap();
        assert_eq!(level, StockLevel::new(2, dec("6")));
    }

    #[test]
    fn value_is_rounded_to_cents() {
        assert_eq!(stock_value(dec("3"), dec("1.333")).unwrap(), dec("4.00"));
        assert_eq!(stock_value(dec("135"), dec("42.5")).unwrap(), dec("5737.5"));
        assert!(stock_value(Decimal::MAX, dec("2")).is_err());
    }

    #[test]
    fn valuation_defaults_to_selling_price() {
        assert_eq!(ValuationBasis::default(), ValuationBasis::SellingPrice);
    }
}
