//! Conversions between API decimals and the cents stored in the database.

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::error::CrmError;

const CENTS_SCALE: u32 = 2;

/// Exact conversion of a decimal amount to cents.
pub fn to_cents(amount: Decimal) -> Result<i64, CrmError> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(CrmError::AmountOutOfRange)?;
    if !scaled.fract().is_zero() {
        return Err(CrmError::InvalidPricePrecision);
    }
    scaled.to_i64().ok_or(CrmError::AmountOutOfRange)
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CENTS_SCALE)
}

/// Smallest cent value that is `>= amount`, saturating at the i64 range.
pub fn lower_bound_cents(amount: Decimal) -> i64 {
    saturating_cents(amount, Decimal::ceil)
}

/// Largest cent value that is `<= amount`, saturating at the i64 range.
pub fn upper_bound_cents(amount: Decimal) -> i64 {
    saturating_cents(amount, Decimal::floor)
}

fn saturating_cents(amount: Decimal, round: fn(&Decimal) -> Decimal) -> i64 {
    let limit = if amount.is_sign_negative() { i64::MIN } else { i64::MAX };
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| round(&scaled).to_i64())
        .unwrap_or(limit)
}
