//! Exact integer helpers for atomic amounts.
//!
//! Every product is widened to 512 bits before dividing, so `a * b / c` never
//! overflows as long as the final quotient fits in 256 bits. Decimal fractions
//! are applied as exact rationals (`mantissa / 10^scale`) and the result is
//! floored.

use crate::error::AmmError;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Decimal places every stable-swap balance is normalised to.
pub const PRECISION_DECIMALS: u8 = 18;

/// Most decimal places a currency may carry.
pub const MAX_DECIMALS: u8 = 38;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const MAX_DECIMAL_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;
const MAX_DECIMAL_SCALE: u32 = 28;

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, AmmError> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero("mul_div"));
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| AmmError::Overflow("mul_div"))
}

/// Splits a non-negative decimal into `(numerator, denominator)`.
pub fn fraction_parts(fraction: Decimal) -> Result<(U256, U256), AmmError> {
    if fraction.is_sign_negative() && !fraction.is_zero() {
        return Err(AmmError::InvalidParameter(format!(
            "fraction {fraction} is negative"
        )));
    }
    let normalized = fraction.normalize();
    let numerator = U256::from(normalized.mantissa().unsigned_abs());
    let denominator = U256::exp10(normalized.scale() as usize);
    Ok((numerator, denominator))
}

/// Multiplies an atomic amount by a non-negative decimal fraction, flooring.
pub fn mul_fraction(value: U256, fraction: Decimal) -> Result<U256, AmmError> {
    let (numerator, denominator) = fraction_parts(fraction)?;
    mul_div(value, numerator, denominator)
}

/// Absolute difference of two unsigned values.
pub fn distance(a: U256, b: U256) -> U256 {
    if a > b { a - b } else { b - a }
}

/// Rejects decimal places above [`MAX_DECIMALS`].
pub fn check_decimals(decimals: u8) -> Result<(), AmmError> {
    if decimals > MAX_DECIMALS {
        return Err(AmmError::InvalidParameter(format!(
            "{decimals} decimals exceed the maximum of {MAX_DECIMALS}"
        )));
    }
    Ok(())
}

fn pow10(exponent: u8) -> U256 {
    U256::exp10(usize::from(exponent))
}

/// Rescales an atomic amount with `decimals` places to [`PRECISION_DECIMALS`].
pub fn to_precision(raw: U256, decimals: u8) -> Result<U256, AmmError> {
    check_decimals(decimals)?;
    match decimals.cmp(&PRECISION_DECIMALS) {
        Ordering::Less => raw
            .checked_mul(pow10(PRECISION_DECIMALS - decimals))
            .ok_or(AmmError::Overflow("to_precision")),
        Ordering::Equal => Ok(raw),
        Ordering::Greater => Ok(raw / pow10(decimals - PRECISION_DECIMALS)),
    }
}

/// Inverse of [`to_precision`], flooring when precision is dropped.
pub fn from_precision(value: U256, decimals: u8) -> Result<U256, AmmError> {
    check_decimals(decimals)?;
    match decimals.cmp(&PRECISION_DECIMALS) {
        Ordering::Less => Ok(value / pow10(PRECISION_DECIMALS - decimals)),
        Ordering::Equal => Ok(value),
        Ordering::Greater => value
            .checked_mul(pow10(decimals - PRECISION_DECIMALS))
            .ok_or(AmmError::Overflow("from_precision")),
    }
}

/// Converts `raw / 10^decimals` into a `Decimal`.
///
/// Trailing digits are dropped when the value does not fit the 96-bit mantissa;
/// fails only when the integer part itself is too large.
pub fn raw_to_decimal(raw: U256, decimals: u8) -> Result<Decimal, AmmError> {
    let mut raw = raw;
    let mut scale = u32::from(decimals);
    let max = U256::from(MAX_DECIMAL_MANTISSA);
    while raw > max || scale > MAX_DECIMAL_SCALE {
        if scale == 0 {
            return Err(AmmError::Overflow("raw_to_decimal"));
        }
        raw = raw / U256::from(10u8);
        scale -= 1;
    }
    let mantissa =
        i128::try_from(raw.low_u128()).map_err(|_| AmmError::Overflow("raw_to_decimal"))?;
    Ok(Decimal::from_i128_with_scale(mantissa, scale))
}

/// Converts a non-negative `Decimal` into atomic units, truncating below one unit.
pub fn decimal_to_raw(value: Decimal, decimals: u8) -> Result<U256, AmmError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmmError::InvalidParameter(format!(
            "amount {value} is negative"
        )));
    }
    check_decimals(decimals)?;
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    mul_div(mantissa, pow10(decimals), U256::exp10(value.scale() as usize))
}
