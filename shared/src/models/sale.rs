//! Sale line models and the pre-sale stock check

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};

/// How a sale was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    MobileMoney,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            "credit" => Ok(PaymentMethod::Credit),
            other => Err(InventoryError::UnknownVariant {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Requested quantity of one item in a sale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleLine {
    pub item_id: Uuid,
    pub quantity_sold: Decimal,
}

/// Stock currently on hand for an item taking part in a sale
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableStock {
    pub name: String,
    pub total_quantity: Decimal,
}

/// Check every line against current stock before anything is written.
///
/// Lines for the same item are summed. The first shortfall rejects the whole
/// sale; an item absent from `available` is reported as not found.
pub fn check_sale_availability(
    lines: &[SaleLine],
    available: &HashMap<Uuid, AvailableStock>,
) -> InventoryResult<()> {
    let mut requested: Vec<(Uuid, Decimal)> = Vec::new();
    for line in lines {
        match requested.iter_mut().find(|(id, _)| *id == line.item_id) {
            Some((_, qty)) => *qty += line.quantity_sold,
            None => requested.push((line.item_id, line.quantity_sold)),
        }
    }

    for (item_id, qty) in requested {
        let stock = available
            .get(&item_id)
            .ok_or_else(|| InventoryError::NotFound(format!("Item {}", item_id)))?;
        if stock.total_quantity < qty {
            return Err(InventoryError::InsufficientStock {
                item: stock.name.clone(),
                available: stock.total_quantity,
                requested: qty,
            });
        }
    }

    Ok(())
}

/// Take every line's quantity off the matching item total.
///
/// Repeated lines for one item are each applied. Run after
/// [`check_sale_availability`]; this does no stock check of its own.
pub fn consume_sale_lines(
    totals: &mut HashMap<Uuid, Decimal>,
    lines: &[SaleLine],
) -> InventoryResult<()> {
    apply_sale_lines(totals, lines, |total, qty| total.checked_sub(qty))
}

/// Put every line's quantity back on the matching item total
pub fn restore_sale_lines(
    totals: &mut HashMap<Uuid, Decimal>,
    lines: &[SaleLine],
) -> InventoryResult<()> {
    apply_sale_lines(totals, lines, |total, qty| total.checked_add(qty))
}

fn apply_sale_lines(
    totals: &mut HashMap<Uuid, Decimal>,
    lines: &[SaleLine],
    op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
) -> InventoryResult<()> {
    for line in lines {
        let total = totals
            .get_mut(&line.item_id)
            .ok_or_else(|| InventoryError::NotFound(format!("Item {}", line.item_id)))?;
        *total = op(*total, line.quantity_sold)
            .ok_or(InventoryError::QuantityOutOfRange(line.quantity_sold))?;
    }
    Ok(())
}

/// Line total rounded to cents
pub fn line_total(quantity_sold: Decimal, unit_price: Decimal) -> Decimal {
    (quantity_sold * unit_price).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn stock(name: &str, qty: &str) -> AvailableStock {
        AvailableStock {
            name: name.to_string(),
            total_quantity: dec(qty),
        }
    }

    #[test]
    fn same_item_lines_are_summed() {
        let sugar = Uuid::new_v4();
        let available = HashMap::from([(sugar, stock("Sugar", "10"))]);
        let lines = [
            SaleLine { item_id: sugar, quantity_sold: dec("6") },
            SaleLine { item_id: sugar, quantity_sold: dec("5") },
        ];
        let err = check_sale_availability(&lines, &available).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                item: "Sugar".to_string(),
                available: dec("10"),
                requested: dec("11"),
            }
        );
    }

    #[test]
    fn unknown_item_is_not_found() {
        let lines = [SaleLine { item_id: Uuid::new_v4(), quantity_sold: dec("1") }];
        let err = check_sale_availability(&lines, &HashMap::new()).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn consume_applies_each_line() {
        let sugar = Uuid::new_v4();
        let salt = Uuid::new_v4();
        let mut totals = HashMap::from([(sugar, dec("10")), (salt, dec("4"))]);
        let lines = [
            SaleLine { item_id: sugar, quantity_sold: dec("2.5") },
            SaleLine { item_id: salt, quantity_sold: dec("1") },
            SaleLine { item_id: sugar, quantity_sold: dec("3") },
        ];
        consume_sale_lines(&mut totals, &lines).unwrap();
        assert_eq!(totals[&sugar], dec("4.5"));
        assert_eq!(totals[&salt], dec("3"));

        restore_sale_lines(&mut totals, &lines).unwrap();
        assert_eq!(totals[&sugar], dec("10"));
        assert_eq!(totals[&salt], dec("4"));
    }

    #[test]
    fn restore_of_unlocked_item_is_not_found() {
        let lines = [SaleLine { item_id: Uuid::new_v4(), quantity_sold: dec("1") }];
        let err = restore_sale_lines(&mut HashMap::new(), &lines).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn restore_past_decimal_range_is_rejected() {
        let sugar = Uuid::new_v4();
        let mut totals = HashMap::from([(sugar, Decimal::MAX)]);
        let lines = [SaleLine { item_id: sugar, quantity_sold: dec("1") }];
        assert_eq!(
            restore_sale_lines(&mut totals, &lines),
            Err(InventoryError::QuantityOutOfRange(dec("1")))
        );
    }

    #[test]
    fn line_totals_round_to_cents() {
        assert_eq!(line_total(dec("0.333"), dec("10")), dec("3.33"));
    }
}
