//! Units of measure and the conversion table between them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, InventoryResult};
use crate::models::PackageGeometry;

/// Unit of measure for item quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    Ml,
    Pcs,
    Box,
    Packet,
    Sack,
    Bottle,
    Can,
}

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::Kg,
        Unit::G,
        Unit::L,
        Unit::Ml,
        Unit::Pcs,
        Unit::Box,
        Unit::Packet,
        Unit::Sack,
        Unit::Bottle,
        Unit::Can,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Pcs => "pcs",
            Unit::Box => "box",
            Unit::Packet => "packet",
            Unit::Sack => "sack",
            Unit::Bottle => "bottle",
            Unit::Can => "can",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|u| u.as_str() == lowered)
            .ok_or_else(|| InventoryError::UnknownVariant {
                kind: "unit",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Unit {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Result of converting a quantity between two units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub quantity: Decimal,
    /// `false` when the pair is not in the table and a 1:1 fallback was used
    pub exact: bool,
}

impl Conversion {
    fn exact(quantity: Decimal) -> Self {
        Self {
            quantity,
            exact: true,
        }
    }
}

const THOUSAND: Decimal = Decimal::ONE_THOUSAND;

/// Convert `quantity` expressed in `from` into `to`.
///
/// Package conversions use the item's geometry: box/packet <-> pcs through
/// `units_per_package`, sack <-> kg through `weight_per_package`. Pairs that are
/// not in the table (or whose geometry is missing) fall back to 1:1 and log a
/// warning. A result outside the decimal range is an error.
pub fn convert_quantity(
    quantity: Decimal,
    from: Unit,
    to: Unit,
    geometry: &PackageGeometry,
) -> InventoryResult<Conversion> {
    if from == to {
        return Ok(Conversion::exact(quantity));
    }

    let units = geometry.units_per_package().map(Decimal::from);
    let weight = geometry.weight_per_package();

    let converted = match (from, to) {
        (Unit::Kg, Unit::G) | (Unit::L, Unit::Ml) => Some(quantity.checked_mul(THOUSAND)),
        (Unit::G, Unit::Kg) | (Unit::Ml, Unit::L) => Some(quantity.checked_div(THOUSAND)),
        (Unit::Box | Unit::Packet, Unit::Pcs) => units.map(|u| quantity.checked_mul(u)),
        (Unit::Pcs, Unit::Box | Unit::Packet) => units.map(|u| quantity.checked_div(u)),
        (Unit::Sack, Unit::Kg) => weight.map(|w| quantity.checked_mul(w)),
        (Unit::Kg, Unit::Sack) => weight.map(|w| quantity.checked_div(w)),
        _ => None,
    };

    match converted {
        Some(Some(q)) => Ok(Conversion::exact(q)),
        Some(None) => Err(InventoryError::QuantityOutOfRange(quantity)),
        None => {
            tracing::warn!(
                from = %from,
                to = %to,
                %quantity,
                "No conversion rule for unit pair, using 1:1"
            );
            Ok(Conversion {
                quantity,
                exact: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sack_of(weight: &str) -> PackageGeometry {
        PackageGeometry::new(ItemType::Weighable, Some(dec(weight)), None).unwrap()
    }

    fn box_of(units: i32) -> PackageGeometry {
        PackageGeometry::new(ItemType::UnitBased, None, Some(units)).unwrap()
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("KG".parse::<Unit>().unwrap(), Unit::Kg);
        assert_eq!(" Sack ".parse::<Unit>().unwrap(), Unit::Sack);
        assert!("furlong".parse::<Unit>().is_err());
    }

    #[test]
    fn metric_prefixes() {
        let g = sack_of("50");
        assert_eq!(convert_quantity(dec("2.5"), Unit::Kg, Unit::G, &g).unwrap().quantity, dec("2500"));
        assert_eq!(convert_quantity(dec("750"), Unit::G, Unit::Kg, &g).unwrap().quantity, dec("0.75"));
        assert_eq!(convert_quantity(dec("1.5"), Unit::L, Unit::Ml, &g).unwrap().quantity, dec("1500"));
        assert_eq!(convert_quantity(dec("250"), Unit::Ml, Unit::L, &g).unwrap().quantity, dec("0.25"));
    }

    #[test]
    fn sack_uses_weight_per_package() {
        let g = sack_of("50");
        let c = convert_quantity(Decimal::ONE, Unit::Sack, Unit::Kg, &g).unwrap();
        assert!(c.exact);
        assert_eq!(c.quantity, dec("50"));
        assert_eq!(convert_quantity(dec("25"), Unit::Kg, Unit::Sack, &g).unwrap().quantity, dec("0.5"));
    }

    #[test]
    fn box_and_packet_use_units_per_package() {
        let g = box_of(24);
        assert_eq!(convert_quantity(dec("2"), Unit::Box, Unit::Pcs, &g).unwrap().quantity, dec("48"));
        assert_eq!(convert_quantity(dec("3"), Unit::Packet, Unit::Pcs, &g).unwrap().quantity, dec("72"));
        assert_eq!(convert_quantity(dec("12"), Unit::Pcs, Unit::Box, &g).unwrap().quantity, dec("0.5"));
    }

    #[test]
    fn package_conversion_without_geometry_falls_back() {
        let g = box_of(24);
        let c = convert_quantity(dec("2"), Unit::Sack, Unit::Kg, &g).unwrap();
        assert!(!c.exact);
        assert_eq!(c.quantity, dec("2"));
    }

    #[test]
    fn unknown_pair_is_one_to_one() {
        let g = sack_of("50");
        let c = convert_quantity(dec("3"), Unit::Bottle, Unit::Kg, &g).unwrap();
        assert!(!c.exact);
        assert_eq!(c.quantity, dec("3"));
    }

    #[test]
    fn overflowing_conversion_is_an_error() {
        let g = sack_of("50");
        assert_eq!(
            convert_quantity(Decimal::MAX, Unit::Kg, Unit::G, &g),
            Err(InventoryError::QuantityOutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn same_unit_is_exact() {
        let g = sack_of("50");
        let c = convert_quantity(dec("7"), Unit::Kg, Unit::Kg, &g).unwrap();
        assert!(c.exact);
        assert_eq!(c.quantity, dec("7"));
    }
}
