//! Validation utilities for inventory inputs

use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Largest quantity or price a `NUMERIC(14, 4)` column holds
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

/// Largest package count accepted on a direct stock edit
pub const MAX_FULL_PACKAGES: i64 = 9_999_999_999;

/// Quantity must be strictly positive (loss quantities, sale lines)
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Amount must be zero or more (prices, costs, adjustment magnitudes, thresholds)
pub fn validate_non_negative(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    if amount > MAX_QUANTITY {
        return Err("Value is too large");
    }
    Ok(())
}

/// Package count for a direct stock edit
pub fn validate_full_packages(full_packages: i64) -> Result<(), &'static str> {
    if full_packages < 0 {
        return Err("Full packages must be a non-negative number");
    }
    if full_packages > MAX_FULL_PACKAGES {
        return Err("Full packages is too large");
    }
    Ok(())
}

// ============================================================================
// Text Validations
// ============================================================================

/// Free text that must carry something besides whitespace (adjustment reasons)
pub fn validate_required_text(text: &str) -> Result<(), &'static str> {
    if text.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// SKU format: 1-64 characters of letters, digits, '-' or '_'
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() || sku.len() > 64 {
        return Err("SKU must be between 1 and 64 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("SKU may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(Decimal::ONE).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::NEGATIVE_ONE).is_err());
        assert!(validate_positive_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_positive_quantity(Decimal::MAX).is_err());
    }

    #[test]
    fn test_max_quantity_matches_column_precision() {
        assert_eq!(MAX_QUANTITY, "9999999999.9999".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(Decimal::new(-1, 2)).is_err());
        assert!(validate_non_negative(MAX_QUANTITY + Decimal::new(1, 4)).is_err());
    }

    #[test]
    fn test_full_packages() {
        assert!(validate_full_packages(0).is_ok());
        assert!(validate_full_packages(-3).is_err());
        assert!(validate_full_packages(MAX_FULL_PACKAGES).is_ok());
        assert!(validate_full_packages(i64::MAX).is_err());
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Damaged in transit").is_ok());
        assert!(validate_required_text("   ").is_err());
    }

    #[test]
    fn test_sku() {
        assert!(validate_sku("RICE-50KG").is_ok());
        assert!(validate_sku("rice_bag_01").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("RICE 50KG").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
    }
}
