//! Balanced (proportional) liquidity math shared by every pool type.
//!
//! The pool must not be empty; an empty reserve or supply surfaces as
//! [`AmmError::DivisionByZero`].

use crate::error::AmmError;
use crate::math::fixed_point::mul_div;
use crate::pool::PoolSnapshot;
use crate::value_objects::amount::CurrencyAmount;

/// Amounts of every pooled currency needed to deposit `amount` proportionally.
pub fn deposit_input_amounts(
    pool: &PoolSnapshot,
    amount: &CurrencyAmount,
) -> Result<Vec<CurrencyAmount>, AmmError> {
    let matched = pool.reserve_of(&amount.currency)?;
    pool.pooled_currencies
        .iter()
        .map(|reserve| Ok(reserve.with_raw(mul_div(reserve.raw, amount.raw, matched.raw)?)))
        .collect()
}

/// LP tokens minted for a proportional deposit led by `amount`.
pub fn deposit_lp_token_amount(
    pool: &PoolSnapshot,
    amount: &CurrencyAmount,
) -> Result<CurrencyAmount, AmmError> {
    let matched = pool.reserve_of(&amount.currency)?;
    let raw = mul_div(pool.total_supply.raw, amount.raw, matched.raw)?;
    Ok(pool.total_supply.with_raw(raw))
}

/// Pooled currencies returned for burning `lp_amount`.
pub fn withdrawal_pooled_currency_amounts(
    pool: &PoolSnapshot,
    lp_amount: &CurrencyAmount,
) -> Result<Vec<CurrencyAmount>, AmmError> {
    lp_amount.ensure_currency(&pool.lp_token)?;
    pool.pooled_currencies
        .iter()
        .map(|reserve| {
            Ok(reserve.with_raw(mul_div(
                reserve.raw,
                lp_amount.raw,
                pool.total_supply.raw,
            )?))
        })
        .collect()
}
