//! Item master data: item kinds and package geometry

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, InventoryResult};

/// How an item's packages are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Sold by weight; a package holds `weight_per_package` base units
    Weighable,
    /// Sold by count; a package holds `units_per_package` base units
    UnitBased,
    /// A package is exactly one base unit
    SingleUnit,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Weighable => "weighable",
            ItemType::UnitBased => "unit_based",
            ItemType::SingleUnit => "single_unit",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighable" => Ok(ItemType::Weighable),
            "unit_based" => Ok(ItemType::UnitBased),
            "single_unit" => Ok(ItemType::SingleUnit),
            other => Err(InventoryError::UnknownVariant {
                kind: "item type",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated package geometry of an item.
///
/// Weighable items carry a positive `weight_per_package` and no unit count;
/// unit-based items carry `units_per_package >= 1` and no weight; single-unit
/// items carry neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageGeometry {
    item_type: ItemType,
    weight_per_package: Option<Decimal>,
    units_per_package: Option<i32>,
}

impl PackageGeometry {
    pub fn new(
        item_type: ItemType,
        weight_per_package: Option<Decimal>,
        units_per_package: Option<i32>,
    ) -> InventoryResult<Self> {
        match item_type {
            ItemType::Weighable => {
                match weight_per_package {
                    Some(w) if w > Decimal::ZERO => {}
                    _ => {
                        return Err(InventoryError::invalid(
                            "weight_per_package",
                            "Weighable items need a weight per package greater than zero",
                        ))
                    }
                }
                if units_per_package.is_some() {
                    return Err(InventoryError::invalid(
                        "units_per_package",
                        "Weighable items cannot have units per package",
                    ));
                }
            }
            ItemType::UnitBased => {
                match units_per_package {
                    Some(u) if u >= 1 => {}
                    _ => {
                        return Err(InventoryError::invalid(
                            "units_per_package",
                            "Unit-based items need at least one unit per package",
                        ))
                    }
                }
                if weight_per_package.is_some() {
                    return Err(InventoryError::invalid(
                        "weight_per_package",
                        "Unit-based items cannot have a weight per package",
                    ));
                }
            }
            ItemType::SingleUnit => {
                if weight_per_package.is_some() || units_per_package.is_some() {
                    return Err(InventoryError::invalid(
                        "item_type",
                        "Single-unit items have no package geometry",
                    ));
                }
            }
        }

        Ok(Self {
            item_type,
            weight_per_package,
            units_per_package,
        })
    }

    pub fn single_unit() -> Self {
        Self {
            item_type: ItemType::SingleUnit,
            weight_per_package: None,
            units_per_package: None,
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn weight_per_package(&self) -> Option<Decimal> {
        self.weight_per_package
    }

    pub fn units_per_package(&self) -> Option<i32> {
        self.units_per_package
    }

    /// Base units held by one full package
    pub fn per_package(&self) -> Decimal {
        match self.item_type {
            ItemType::Weighable => self.weight_per_package.unwrap_or(Decimal::ONE),
            ItemType::UnitBased => self
                .units_per_package
                .map(Decimal::from)
                .unwrap_or(Decimal::ONE),
            ItemType::SingleUnit => Decimal::ONE,
        }
    }

    /// Base units held by `packages` full packages
    pub fn packages_to_base(&self, packages: Decimal) -> InventoryResult<Decimal> {
        packages
            .checked_mul(self.per_package())
            .ok_or(InventoryError::QuantityOutOfRange(packages))
    }

    /// Purchase cost of one base unit given the price of a whole package
    pub fn purchase_price_per_unit(&self, purchase_price_per_package: Decimal) -> Decimal {
        purchase_price_per_package / self.per_package()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn weighable_requires_positive_weight() {
        assert!(PackageGeometry::new(ItemType::Weighable, Some(dec("50")), None).is_ok());
        assert!(PackageGeometry::new(ItemType::Weighable, None, None).is_err());
        assert!(PackageGeometry::new(ItemType::Weighable, Some(Decimal::ZERO), None).is_err());
        assert!(PackageGeometry::new(ItemType::Weighable, Some(dec("-1")), None).is_err());
    }

    #[test]
    fn weighable_rejects_unit_count() {
        let err = PackageGeometry::new(ItemType::Weighable, Some(dec("50")), Some(10)).unwrap_err();
        assert!(matches!(err, InventoryError::Invalid { field: "units_per_package", .. }));
    }

    #[test]
    fn unit_based_requires_at_least_one_unit() {
        assert!(PackageGeometry::new(ItemType::UnitBased, None, Some(1)).is_ok());
        assert!(PackageGeometry::new(ItemType::UnitBased, None, Some(0)).is_err());
        assert!(PackageGeometry::new(ItemType::UnitBased, None, None).is_err());
        assert!(PackageGeometry::new(ItemType::UnitBased, Some(dec("1")), Some(12)).is_err());
    }

    #[test]
    fn single_unit_has_no_geometry() {
        let g = PackageGeometry::new(ItemType::SingleUnit, None, None).unwrap();
        assert_eq!(g, PackageGeometry::single_unit());
        assert_eq!(g.per_package(), Decimal::ONE);
        assert!(PackageGeometry::new(ItemType::SingleUnit, Some(dec("2")), None).is_err());
    }

    #[test]
    fn per_package_follows_type() {
        let sack = PackageGeometry::new(ItemType::Weighable, Some(dec("25.5")), None).unwrap();
        assert_eq!(sack.per_package(), dec("25.5"));
        assert_eq!(sack.packages_to_base(dec("2")).unwrap(), dec("51.0"));

        let carton = PackageGeometry::new(ItemType::UnitBased, None, Some(12)).unwrap();
        assert_eq!(carton.per_package(), dec("12"));
        assert_eq!(carton.packages_to_base(dec("3")).unwrap(), dec("36"));
    }

    #[test]
    fn packages_to_base_reports_overflow() {
        let sack = PackageGeometry::new(ItemType::Weighable, Some(dec("50")), None).unwrap();
        assert_eq!(
            sack.packages_to_base(Decimal::MAX),
            Err(InventoryError::QuantityOutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn purchase_price_per_unit_divides_package_price() {
        let sack = PackageGeometry::new(ItemType::Weighable, Some(dec("50")), None).unwrap();
        assert_eq!(sack.purchase_price_per_unit(dec("2500")), dec("50"));

        let single = PackageGeometry::single_unit();
        assert_eq!(single.purchase_price_per_unit(dec("3.75")), dec("3.75"));
    }

    #[test]
    fn item_type_round_trips_through_str() {
        for t in [ItemType::Weighable, ItemType::UnitBased, ItemType::SingleUnit] {
            assert_eq!(t.as_str().parse::<ItemType>().unwrap(), t);
        }
        assert!("bulk".parse::<ItemType>().is_err());
    }
}
