//! `validator` hooks backed by the shared inventory validators

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

fn to_error(code: &'static str, result: Result<(), &'static str>) -> Result<(), ValidationError> {
    result.map_err(|msg| {
        let mut err = ValidationError::new(code);
        err.message = Some(Cow::Borrowed(msg));
        err
    })
}

pub fn positive_quantity(value: &Decimal) -> Result<(), ValidationError> {
    to_error("positive", shared::validate_positive_quantity(*value))
}

pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    to_error("non_negative", shared::validate_non_negative(*value))
}

pub fn required_text(value: &str) -> Result<(), ValidationError> {
    to_error("required", shared::validate_required_text(value))
}

pub fn sku(value: &str) -> Result<(), ValidationError> {
    to_error("sku", shared::validate_sku(value))
}
