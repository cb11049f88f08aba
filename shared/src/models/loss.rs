//! Item loss (shrinkage) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Why stock was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    Damage,
    Expiration,
    Spoilage,
    Theft,
    Contamination,
    Other,
}

impl LossReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossReason::Damage => "damage",
            LossReason::Expiration => "expiration",
            LossReason::Spoilage => "spoilage",
            LossReason::Theft => "theft",
            LossReason::Contamination => "contamination",
            LossReason::Other => "other",
        }
    }
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LossReason {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "damage" => Ok(LossReason::Damage),
            "expiration" => Ok(LossReason::Expiration),
            "spoilage" => Ok(LossReason::Spoilage),
            "theft" => Ok(LossReason::Theft),
            "contamination" => Ok(LossReason::Contamination),
            "other" => Ok(LossReason::Other),
            other => Err(InventoryError::UnknownVariant {
                kind: "loss reason",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LossReason {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Monetary value of a loss: quantity lost times the estimated cost per unit
pub fn total_loss_value(quantity_lost: Decimal, estimated_cost: Decimal) -> Decimal {
    (quantity_lost * estimated_cost).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_value() {
        let q: Decimal = "2.5".parse().unwrap();
        let c: Decimal = "12.40".parse().unwrap();
        assert_eq!(total_loss_value(q, c), "31.00".parse::<Decimal>().unwrap());
        assert_eq!(total_loss_value(q, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn reasons_parse() {
        assert_eq!("theft".parse::<LossReason>().unwrap(), LossReason::Theft);
        assert!("misplaced".parse::<LossReason>().is_err());
    }
}
