//! N-asset stable-swap pool.
//!
//! Every operation normalises the reserves to 18 decimals, recomputes `D` from
//! scratch and converts the result back to the output currency's atomic
//! units. Nothing is cached between calls.

use crate::error::AmmError;
use crate::math::fixed_point::{
    PRECISION_DECIMALS, check_decimals, distance, fraction_parts, from_precision, mul_div,
    mul_fraction, raw_to_decimal, to_precision,
};
use crate::math::stable_swap;
use crate::pool::PoolSnapshot;
use crate::token::{Currency, CurrencyKind};
use crate::value_objects::amount::CurrencyAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StablePool {
    pool_id: u32,
    snapshot: PoolSnapshot,
    amplification_coefficient: u64,
}

impl StablePool {
    pub fn new(
        pool_id: u32,
        snapshot: PoolSnapshot,
        amplification_coefficient: u64,
    ) -> Result<Self, AmmError> {
        snapshot.validate()?;
        if snapshot.size() < 2 {
            return Err(AmmError::PoolSizeMismatch {
                expected: 2,
                actual: snapshot.size(),
            });
        }
        if amplification_coefficient == 0 {
            return Err(AmmError::InvalidParameter(
                "amplification coefficient must be positive".to_string(),
            ));
        }
        if snapshot.lp_token.kind != (CurrencyKind::StableLpToken { pool_id }) {
            return Err(AmmError::InvalidParameter(format!(
                "{} is not the LP token of stable pool {pool_id}",
                snapshot.lp_token
            )));
        }
        Ok(Self {
            pool_id,
            snapshot,
            amplification_coefficient,
        })
    }

    pub fn pool_id(&self) -> u32 {
        self.pool_id
    }

    pub fn snapshot(&self) -> &PoolSnapshot {
        &self.snapshot
    }

    pub fn lp_token(&self) -> &Currency {
        &self.snapshot.lp_token
    }

    pub fn amplification_coefficient(&self) -> u64 {
        self.amplification_coefficient
    }

    /// The balances that enter the invariant, in coin order.
    pub fn actually_pooled_currencies(&self) -> &[CurrencyAmount] {
        &self.snapshot.pooled_currencies
    }

    pub fn token_index(&self, currency: &Currency) -> Result<usize, AmmError> {
        self.snapshot.index_of(currency)
    }

    fn amp(&self) -> U256 {
        U256::from(self.amplification_coefficient)
    }

    fn n_coins(&self) -> usize {
        self.snapshot.size()
    }

    fn coin(&self, index: usize) -> Result<&CurrencyAmount, AmmError> {
        self.snapshot
            .pooled_currencies
            .get(index)
            .ok_or(AmmError::IndexOutOfRange {
                index,
                size: self.n_coins(),
            })
    }

    /// Reserves normalised to the common precision.
    pub fn xp(&self) -> Result<Vec<U256>, AmmError> {
        normalise(&self.snapshot.pooled_currencies)
    }

    /// Current invariant at the common precision.
    pub fn get_d(&self) -> Result<U256, AmmError> {
        stable_swap::get_d(&self.xp()?, self.amp())
    }

    /// Normalised balance of `out_index` once `in_index` holds `in_balance`.
    pub fn get_y(
        &self,
        in_index: usize,
        out_index: usize,
        in_balance: U256,
    ) -> Result<U256, AmmError> {
        stable_swap::get_y(in_index, out_index, in_balance, &self.xp()?, self.amp())
    }

    /// Output of swapping `input` (coin `in_index`) into coin `out_index`, net of fee.
    pub fn calculate_swap(
        &self,
        in_index: usize,
        out_index: usize,
        input: &CurrencyAmount,
    ) -> Result<CurrencyAmount, AmmError> {
        let coin_in = self.coin(in_index)?;
        let coin_out = self.coin(out_index)?;
        input.ensure_currency(&coin_in.currency)?;

        let xp = self.xp()?;
        let dx = to_precision(input.raw, coin_in.currency.decimals)?;
        let x = xp[in_index]
            .checked_add(dx)
            .ok_or(AmmError::Overflow("calculate_swap"))?;
        let y = stable_swap::get_y(in_index, out_index, x, &xp, self.amp())?;

        // one atomic unit is held back against rounding in the solver
        let raw_out = from_precision(xp[out_index].saturating_sub(y), coin_out.currency.decimals)?
            .saturating_sub(U256::one());
        let fee = mul_fraction(raw_out, self.snapshot.trading_fee)?;
        trace!(pool_id = self.pool_id, %raw_out, %fee, "stable swap");

        let net = raw_out
            .checked_sub(fee)
            .ok_or(AmmError::Overflow("calculate_swap"))?;
        Ok(coin_out.with_raw(net))
    }

    /// Currency-addressed form of [`calculate_swap`](Self::calculate_swap).
    pub fn get_output_amount(
        &self,
        input: &CurrencyAmount,
        output_currency: &Currency,
    ) -> Result<CurrencyAmount, AmmError> {
        let in_index = self.token_index(&input.currency)?;
        let out_index = self.token_index(output_currency)?;
        self.calculate_swap(in_index, out_index, input)
    }

    /// LP tokens minted by depositing, or burned by withdrawing, `amounts`.
    ///
    /// `amounts` must name every coin exactly once, in any order.
    pub fn calculate_token_amount(
        &self,
        amounts: &[CurrencyAmount],
        deposit: bool,
    ) -> Result<CurrencyAmount, AmmError> {
        let ordered = self.sort_amounts(amounts)?;
        let total_supply = &self.snapshot.total_supply;

        let d0 = self.get_d()?;
        let new_balances = self
            .snapshot
            .pooled_currencies
            .iter()
            .zip(ordered)
            .map(|(reserve, delta)| {
                let delta = reserve.with_raw(delta);
                if deposit {
                    reserve.checked_add(&delta)
                } else {
                    reserve.checked_sub(&delta)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let d1 = stable_swap::get_d(&normalise(&new_balances)?, self.amp())?;

        if total_supply.is_zero() {
            let minted = from_precision(d1, total_supply.currency.decimals)?;
            return Ok(total_supply.with_raw(minted));
        }
        let raw = mul_div(total_supply.raw, distance(d1, d0), d0)?;
        Ok(total_supply.with_raw(raw))
    }

    fn sort_amounts(&self, amounts: &[CurrencyAmount]) -> Result<Vec<U256>, AmmError> {
        if amounts.len() != self.n_coins() {
            return Err(AmmError::PoolSizeMismatch {
                expected: self.n_coins(),
                actual: amounts.len(),
            });
        }
        let mut ordered: Vec<Option<U256>> = vec![None; self.n_coins()];
        for amount in amounts {
            let index = self.token_index(&amount.currency)?;
            if ordered[index].replace(amount.raw).is_some() {
                return Err(AmmError::DuplicateCurrency(amount.currency.ticker.clone()));
            }
        }
        // length matches and no index repeats, so every slot is filled
        Ok(ordered.into_iter().map(Option::unwrap_or_default).collect())
    }

    /// Amount of coin `out_index` received for burning `lp_amount`, and the
    /// imbalance fee charged on it.
    pub fn calculate_remove_liquidity_one_token(
        &self,
        lp_amount: &CurrencyAmount,
        out_index: usize,
    ) -> Result<(CurrencyAmount, CurrencyAmount), AmmError> {
        lp_amount.ensure_currency(self.lp_token())?;
        let coin_out = self.coin(out_index)?;
        let total_supply = &self.snapshot.total_supply;
        if lp_amount.raw > total_supply.raw {
            return Err(AmmError::InsufficientLiquidity(format!(
                "burning {lp_amount} of {total_supply}"
            )));
        }

        let amp = self.amp();
        let n = self.n_coins();
        let xp = self.xp()?;
        let d0 = stable_swap::get_d(&xp, amp)?;
        let d1 = d0 - mul_div(lp_amount.raw, d0, total_supply.raw)?;
        let new_y = stable_swap::get_y_d(amp, out_index, &xp, d1)?;

        // fee * n / (4 * (n - 1)) kept as an exact ratio
        let (fee_numerator, fee_denominator) = fraction_parts(self.snapshot.trading_fee)?;
        let per_token_numerator = fee_numerator * U256::from(n);
        let per_token_denominator = fee_denominator * U256::from(4 * (n - 1));

        let mut reduced = xp.clone();
        for (j, balance) in xp.iter().enumerate() {
            let ideal = mul_div(*balance, d1, d0)?;
            let expected = if j == out_index {
                ideal.saturating_sub(new_y)
            } else {
                *balance - ideal
            };
            let fee = mul_div(expected, per_token_numerator, per_token_denominator)?;
            reduced[j] = reduced[j].saturating_sub(fee);
        }

        let y_reduced = stable_swap::get_y_d(amp, out_index, &reduced, d1)?;
        let decimals = coin_out.currency.decimals;
        let dy = from_precision(reduced[out_index].saturating_sub(y_reduced), decimals)?
            .saturating_sub(U256::one());
        let dy_without_fee = from_precision(xp[out_index].saturating_sub(new_y), decimals)?;

        Ok((
            coin_out.with_raw(dy),
            coin_out.with_raw(dy_without_fee.saturating_sub(dy)),
        ))
    }

    /// Value of one LP token in units of the invariant.
    pub fn virtual_price(&self) -> Result<Decimal, AmmError> {
        let total_supply = &self.snapshot.total_supply;
        check_decimals(total_supply.currency.decimals)?;
        let scaled = mul_div(
            self.get_d()?,
            U256::exp10(usize::from(total_supply.currency.decimals)),
            total_supply.raw,
        )?;
        raw_to_decimal(scaled, PRECISION_DECIMALS)
    }
}

fn normalise(amounts: &[CurrencyAmount]) -> Result<Vec<U256>, AmmError> {
    amounts
        .iter()
        .map(|amount| to_precision(amount.raw, amount.currency.decimals))
        .collect()
}
