//! Sale stock tests
//!
//! A sale is checked line by line against stock before anything is written.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    check_sale_availability, consume_sale_lines, line_total, restore_sale_lines, AvailableStock,
    InventoryError, PaymentMethod, SaleLine,
};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn stock(entries: &[(Uuid, &str, &str)]) -> HashMap<Uuid, AvailableStock> {
    entries
        .iter()
        .map(|(id, name, qty)| {
            (
                *id,
                AvailableStock {
                    name: name.to_string(),
                    total_quantity: dec(qty),
                },
            )
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_sale_within_stock_passes() {
        let rice = Uuid::new_v4();
        let sugar = Uuid::new_v4();
        let available = stock(&[(rice, "Rice", "110"), (sugar, "Sugar", "5")]);
        let lines = [
            SaleLine { item_id: rice, quantity_sold: dec("10") },
            SaleLine { item_id: sugar, quantity_sold: dec("5") },
        ];
        assert!(check_sale_availability(&lines, &available).is_ok());
    }

    /// One short line rejects the whole sale
    #[test]
    fn test_one_short_line_rejects_sale() {
        let rice = Uuid::new_v4();
        let sugar = Uuid::new_v4();
        let available = stock(&[(rice, "Rice", "110"), (sugar, "Sugar", "2")]);
        let lines = [
            SaleLine { item_id: rice, quantity_sold: dec("10") },
            SaleLine { item_id: sugar, quantity_sold: dec("3") },
        ];
        assert!(matches!(
            check_sale_availability(&lines, &available),
            Err(InventoryError::InsufficientStock { ref item, .. }) if item == "Sugar"
        ));
    }

    #[test]
    fn test_repeated_item_lines_are_summed() {
        let rice = Uuid::new_v4();
        let available = stock(&[(rice, "Rice", "10")]);
        let lines = [
            SaleLine { item_id: rice, quantity_sold: dec("6") },
            SaleLine { item_id: rice, quantity_sold: dec("6") },
        ];
        assert!(matches!(
            check_sale_availability(&lines, &available),
            Err(InventoryError::InsufficientStock { requested, .. }) if requested == dec("12")
        ));
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let lines = [SaleLine { item_id: Uuid::new_v4(), quantity_sold: dec("1") }];
        assert!(matches!(
            check_sale_availability(&lines, &HashMap::new()),
            Err(InventoryError::NotFound(_))
        ));
    }

    /// A sale with two lines for rice takes both off, and voiding it puts both back
    #[test]
    fn test_consume_and_restore_repeated_lines() {
        let rice = Uuid::new_v4();
        let mut totals = HashMap::from([(rice, dec("110"))]);
        let lines = [
            SaleLine { item_id: rice, quantity_sold: dec("10") },
            SaleLine { item_id: rice, quantity_sold: dec("2.5") },
        ];
        consume_sale_lines(&mut totals, &lines).unwrap();
        assert_eq!(totals[&rice], dec("97.5"));
        restore_sale_lines(&mut totals, &lines).unwrap();
        assert_eq!(totals[&rice], dec("110"));
    }

    #[test]
    fn test_line_total_and_payment_default() {
        assert_eq!(line_total(dec("2.5"), dec("3.333")), dec("8.33"));
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
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

        /// Availability passes exactly when the requested amount fits
        #[test]
        fn prop_sale_accepted_iff_stock_covers_it(
            on_hand in quantity_strategy(),
            sold in quantity_strategy()
        ) {
            let id = Uuid::new_v4();
            let available = HashMap::from([(
                id,
                AvailableStock { name: "Rice".to_string(), total_quantity: on_hand },
            )]);
            let result = check_sale_availability(
                &[SaleLine { item_id: id, quantity_sold: sold }],
                &available,
            );
            prop_assert_eq!(result.is_ok(), sold <= on_hand);
        }

        /// Voiding a sale returns every item to its starting total, however
        /// many lines hit the same item
        #[test]
        fn prop_consume_then_restore_returns_start(
            starts in prop::collection::vec(quantity_strategy(), 1..4),
            picks in prop::collection::vec((0usize..4, quantity_strategy()), 1..12)
        ) {
            let ids: Vec<Uuid> = starts.iter().map(|_| Uuid::new_v4()).collect();
            let start: HashMap<Uuid, Decimal> = ids.iter().copied().zip(starts).collect();
            let lines: Vec<SaleLine> = picks
                .into_iter()
                .map(|(i, qty)| SaleLine { item_id: ids[i % ids.len()], quantity_sold: qty })
                .collect();

            let mut totals = start.clone();
            consume_sale_lines(&mut totals, &lines).unwrap();
            for id in &ids {
                let sold: Decimal = lines
                    .iter()
                    .filter(|l| l.item_id == *id)
                    .map(|l| l.quantity_sold)
                    .sum();
                prop_assert_eq!(totals[id], start[id] - sold);
            }

            restore_sale_lines(&mut totals, &lines).unwrap();
            prop_assert_eq!(totals, start);
        }
    }
}
