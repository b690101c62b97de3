use crate::error::AmmError;
use crate::math::fixed_point::{fraction_parts, raw_to_decimal};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula: dy = y * dx / (x + dx)
/// taking fee into account: dy = y * (dx * (1 - fee)) / (x + (dx * (1 - fee)))
///
/// The fee fraction is applied as an exact rational so nothing is rounded
/// before the final floor. Returns zero when either reserve is empty.
pub fn calculate_out_amount(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee: Decimal,
) -> Result<U256, AmmError> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(U256::zero());
    }
    if fee >= Decimal::ONE {
        return Err(AmmError::InvalidParameter(format!("fee {fee} is not below 1")));
    }

    // (1 - fee) = keep_num / keep_den
    let (keep_num, keep_den) = fraction_parts(Decimal::ONE - fee)?;

    let amount_in_with_fee = amount_in.full_mul(keep_num);
    let numerator = amount_in_with_fee
        .checked_mul(U512::from(reserve_out))
        .ok_or(AmmError::Overflow("calculate_out_amount"))?;
    let denominator = reserve_in
        .full_mul(keep_den)
        .checked_add(amount_in_with_fee)
        .ok_or(AmmError::Overflow("calculate_out_amount"))?;

    U256::try_from(numerator / denominator).map_err(|_| AmmError::Overflow("calculate_out_amount"))
}

/// Calculates the spot price of token_in in terms of token_out
/// Price = reserve_out / reserve_in
pub fn calculate_spot_price(
    reserve_in: U256,
    decimals_in: u8,
    reserve_out: U256,
    decimals_out: u8,
) -> Result<Decimal, AmmError> {
    let r_in = raw_to_decimal(reserve_in, decimals_in)?;
    let r_out = raw_to_decimal(reserve_out, decimals_out)?;

    if r_in.is_zero() {
        return Err(AmmError::DivisionByZero("calculate_spot_price"));
    }

    r_out
        .checked_div(r_in)
        .ok_or(AmmError::Overflow("calculate_spot_price"))
}

/// Calculates the constant product K
pub fn calculate_k(reserve0: U256, reserve1: U256) -> U512 {
    reserve0.full_mul(reserve1)
}
