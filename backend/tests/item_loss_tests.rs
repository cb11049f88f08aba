//! Item loss tests
//!
//! Unit conversion into the item's base unit, the stock check and restore.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    convert_quantity, plan_loss_deduction, restore_loss, total_loss_value, InventoryError,
    ItemType, LossReason, PackageGeometry, Unit,
};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn rice() -> PackageGeometry {
    PackageGeometry::new(ItemType::Weighable, Some(dec("50")), None).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// One sack of a 50 kg item takes 50 kg off the total
    #[test]
    fn test_sack_loss_deducts_weight_per_package() {
        let deduction =
            plan_loss_deduction("Rice", dec("110"), dec("1"), Unit::Sack, Unit::Kg, &rice())
                .unwrap();
        assert_eq!(deduction.base_quantity, dec("50"));
        assert_eq!(deduction.remaining, dec("60"));
        assert!(deduction.exact_conversion);
    }

    /// 15 kg lost out of 10 kg is rejected
    #[test]
    fn test_loss_larger_than_stock_fails() {
        let err = plan_loss_deduction("Rice", dec("10"), dec("15"), Unit::Kg, Unit::Kg, &rice())
            .unwrap_err();
        match err {
            InventoryError::InsufficientStock {
                item,
                available,
                requested,
            } => {
                assert_eq!(item, "Rice");
                assert_eq!(available, dec("10"));
                assert_eq!(requested, dec("15"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_grams_convert_to_kilograms() {
        let deduction =
            plan_loss_deduction("Rice", dec("10"), dec("2500"), Unit::G, Unit::Kg, &rice())
                .unwrap();
        assert_eq!(deduction.base_quantity, dec("2.5"));
        assert_eq!(deduction.remaining, dec("7.5"));
    }

    #[test]
    fn test_boxes_convert_to_pieces() {
        let soap = PackageGeometry::new(ItemType::UnitBased, None, Some(12)).unwrap();
        let conversion = convert_quantity(dec("2"), Unit::Box, Unit::Pcs, &soap).unwrap();
        assert_eq!(conversion.quantity, dec("24"));
        assert!(conversion.exact);
    }

    #[test]
    fn test_unknown_pair_falls_back_to_one_to_one() {
        let conversion = convert_quantity(dec("3"), Unit::Bottle, Unit::L, &rice()).unwrap();
        assert_eq!(conversion.quantity, dec("3"));
        assert!(!conversion.exact);
    }

    /// Kilograms to grams past the decimal range fails instead of panicking
    #[test]
    fn test_oversized_loss_conversion_is_rejected() {
        let err = plan_loss_deduction("Rice", dec("10"), Decimal::MAX, Unit::Kg, Unit::G, &rice())
            .unwrap_err();
        assert_eq!(err, InventoryError::QuantityOutOfRange(Decimal::MAX));
    }

    #[test]
    fn test_restore_is_not_capped() {
        assert_eq!(restore_loss(dec("60"), dec("50")), dec("110"));
    }

    #[test]
    fn test_loss_value_and_reasons() {
        assert_eq!(total_loss_value(dec("3"), dec("2.499")), dec("7.50"));
        assert_eq!(LossReason::from_str("spoilage").unwrap(), LossReason::Spoilage);
        assert!(LossReason::from_str("lost").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A recorded loss never leaves the total below zero, and deleting it
        /// gives back exactly what was taken
        #[test]
        fn prop_loss_then_restore(
            stock in quantity_strategy(),
            lost in quantity_strategy()
        ) {
            match plan_loss_deduction("Rice", stock, lost, Unit::Kg, Unit::Kg, &rice()) {
                Ok(deduction) => {
                    prop_assert!(deduction.remaining >= Decimal::ZERO);
                    prop_assert_eq!(restore_loss(deduction.remaining, deduction.base_quantity), stock);
                }
                Err(InventoryError::InsufficientStock { .. }) => prop_assert!(lost > stock),
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
