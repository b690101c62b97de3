//! Trade results and the price-impact model.
//!
//! Price impact is measured against a sample trade roughly `1 / sample_divisor`
//! the size of the real input, run through the same path. Inputs smaller than
//! `sample_divisor` atomic units are their own sample and report zero impact.

use crate::path::{PathElement, PathStep, path_output};
use amm_router_domain::error::AmmError;
use amm_router_domain::math::fixed_point::{PRECISION_DECIMALS, raw_to_decimal};
use amm_router_domain::pool::Pool;
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::{CurrencyAmount, Price};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// Default ratio between a trade's input and its price-impact sample.
pub const DEFAULT_SAMPLE_DIVISOR: u64 = 1000;

/// A priced route from one currency amount to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub path: Vec<PathElement>,
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
    /// Output per unit of input, in human units.
    pub execution_price: Price,
    /// Percentage shortfall against the sample's spot price. Negative values
    /// are a bonus.
    pub price_impact: Decimal,
}

impl Trade {
    pub fn new(
        path: Vec<PathElement>,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
    ) -> Result<Self, AmmError> {
        Self::with_sample_divisor(path, input_amount, output_amount, DEFAULT_SAMPLE_DIVISOR)
    }

    pub fn with_sample_divisor(
        path: Vec<PathElement>,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
        sample_divisor: u64,
    ) -> Result<Self, AmmError> {
        if sample_divisor == 0 {
            return Err(AmmError::InvalidParameter(
                "sample divisor must be positive".to_string(),
            ));
        }
        let execution_price = Price::from_amounts(&input_amount, &output_amount)?;
        let price_impact = price_impact(&path, &input_amount, &output_amount, sample_divisor)?;
        Ok(Self {
            path,
            input_amount,
            output_amount,
            execution_price,
            price_impact,
        })
    }

    pub fn output_currency(&self) -> &Currency {
        &self.output_amount.currency
    }

    /// Smallest acceptable output when tolerating `max_slippage` percent.
    pub fn minimum_output_amount(&self, max_slippage: Decimal) -> Result<CurrencyAmount, AmmError> {
        if max_slippage.is_sign_negative() || max_slippage > Decimal::ONE_HUNDRED {
            return Err(AmmError::InvalidParameter(format!(
                "slippage {max_slippage}% outside [0, 100]"
            )));
        }
        let keep = Decimal::ONE - max_slippage / Decimal::ONE_HUNDRED;
        self.output_amount.mul_fraction(keep)
    }

    /// True when this trade should replace `other` as the best candidate.
    ///
    /// Higher output wins; equal outputs fall back to the lower (or equal)
    /// price impact.
    pub fn is_better(&self, other: Option<&Trade>) -> Result<bool, AmmError> {
        let Some(other) = other else {
            return Ok(true);
        };
        if self.input_amount != other.input_amount {
            return Err(AmmError::IncomparableTrades("input amounts differ"));
        }
        if self.output_currency() != other.output_currency() {
            return Err(AmmError::IncomparableTrades("output currencies differ"));
        }
        Ok(match self.output_amount.raw.cmp(&other.output_amount.raw) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.price_impact <= other.price_impact,
        })
    }

    pub fn to_swap_instruction(&self, max_slippage: Decimal) -> Result<SwapInstruction, AmmError> {
        Ok(SwapInstruction {
            path: self.path.iter().map(PathElement::to_step).collect(),
            input_amount: self.input_amount.clone(),
            minimum_output_amount: self.minimum_output_amount(max_slippage)?,
        })
    }
}

/// `100 * (1 - (output / input) / (sample_out / sample))`, computed on atomic
/// amounts so the currencies' decimals cancel.
fn price_impact(
    path: &[PathElement],
    input: &CurrencyAmount,
    output: &CurrencyAmount,
    sample_divisor: u64,
) -> Result<Decimal, AmmError> {
    if input.is_zero() {
        return Ok(Decimal::ZERO);
    }
    // below the sample's resolution the sample is the input itself
    let sample_raw = input.raw / U256::from(sample_divisor);
    let sample = if sample_raw.is_zero() {
        input.clone()
    } else {
        input.with_raw(sample_raw)
    };
    let sample_out = path_output(path, &sample)?;
    if sample_out.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let scale = U512::from(U256::exp10(usize::from(PRECISION_DECIMALS) + 2));
    let numerator = output
        .raw
        .full_mul(sample.raw)
        .checked_mul(scale)
        .ok_or(AmmError::Overflow("price_impact"))?;
    let denominator = sample_out.raw.full_mul(input.raw);
    let ratio = U256::try_from(numerator / denominator)
        .map_err(|_| AmmError::Overflow("price_impact"))?;

    Ok(Decimal::ONE_HUNDRED - raw_to_decimal(ratio, PRECISION_DECIMALS)?)
}

/// What the transaction encoder needs to submit a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapInstruction {
    pub path: Vec<PathStep>,
    pub input_amount: CurrencyAmount,
    pub minimum_output_amount: CurrencyAmount,
}

/// What the transaction encoder needs to add or remove liquidity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityInstruction {
    pub pooled_currencies: Vec<CurrencyAmount>,
    /// LP token identifying the pool.
    pub pool: Currency,
}

impl LiquidityInstruction {
    /// Balanced deposit led by `amount`.
    pub fn deposit(pool: &Pool, amount: &CurrencyAmount) -> Result<Self, AmmError> {
        Ok(Self {
            pooled_currencies: pool.deposit_input_amounts(amount)?,
            pool: pool.lp_token().clone(),
        })
    }

    /// Balanced withdrawal burning `lp_amount`.
    pub fn withdrawal(pool: &Pool, lp_amount: &CurrencyAmount) -> Result<Self, AmmError> {
        Ok(Self {
            pooled_currencies: pool.withdrawal_pooled_currency_amounts(lp_amount)?,
            pool: pool.lp_token().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_router_domain::pool::PoolSnapshot;
    use amm_router_domain::pools::StandardPool;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn ksm() -> Currency {
        Currency::new("KSM", 12)
    }

    fn kbtc() -> Currency {
        Currency::new("KBTC", 12)
    }

    fn lp() -> Currency {
        Currency::standard_lp("LP-KSM-KBTC", 12)
    }

    fn standard_pool() -> StandardPool {
        let snapshot = PoolSnapshot::new(
            lp(),
            vec![
                CurrencyAmount::from_decimal(ksm(), dec!(1000)).unwrap(),
                CurrencyAmount::from_decimal(kbtc(), dec!(2000)).unwrap(),
            ],
            dec!(0.003),
            CurrencyAmount::from_decimal(lp(), dec!(100)).unwrap(),
            vec![],
        )
        .unwrap();
        StandardPool::new(snapshot, true).unwrap()
    }

    fn trade(input: Decimal) -> Trade {
        let pair = Arc::new(standard_pool());
        let input = CurrencyAmount::from_decimal(ksm(), input).unwrap();
        let output = pair.get_output_amount(&input).unwrap();
        let path = vec![PathElement::Standard {
            input: ksm(),
            output: kbtc(),
            pair,
        }];
        Trade::new(path, input, output).unwrap()
    }

    fn with_output(base: &Trade, output: Decimal, impact: Decimal) -> Trade {
        Trade {
            output_amount: CurrencyAmount::from_decimal(kbtc(), output).unwrap(),
            price_impact: impact,
            ..base.clone()
        }
    }

    #[test]
    fn test_execution_price_and_impact() {
        let trade = trade(dec!(10));

        // 19.7431 KBTC for 10 KSM
        let price = trade.execution_price.value;
        assert!((price - dec!(1.97431606)).abs() < dec!(0.000001));
        // spot ~1.99398 after fee, so ~0.986% impact
        assert!(trade.price_impact > dec!(0.9) && trade.price_impact < dec!(1.1));
    }

    #[test]
    fn test_impact_grows_with_size() {
        assert!(trade(dec!(100)).price_impact > trade(dec!(10)).price_impact);
    }

    #[test]
    fn test_tiny_input_reports_no_impact() {
        let pair = Arc::new(standard_pool());
        let input = CurrencyAmount::new(ksm(), U256::from(5u8));
        let output = pair.get_output_amount(&input).unwrap();
        let path = vec![PathElement::Standard {
            input: ksm(),
            output: kbtc(),
            pair,
        }];
        let trade = Trade::new(path, input, output).unwrap();
        assert_eq!(trade.price_impact, Decimal::ZERO);
    }

    #[test]
    fn test_minimum_output_amount() {
        let trade = with_output(&trade(dec!(10)), dec!(20), Decimal::ZERO);
        let minimum = trade.minimum_output_amount(dec!(0.5)).unwrap();
        assert_eq!(minimum.to_decimal().unwrap(), dec!(19.9));
        assert!(trade.minimum_output_amount(dec!(101)).is_err());
        assert!(trade.minimum_output_amount(dec!(-1)).is_err());
    }

    #[test]
    fn test_is_better_prefers_higher_output() {
        let base = trade(dec!(10));
        let high = with_output(&base, dec!(20), dec!(5));
        let low = with_output(&base, dec!(19), dec!(0.1));

        assert!(high.is_better(Some(&low)).unwrap());
        assert!(!low.is_better(Some(&high)).unwrap());
        assert!(low.is_better(None).unwrap());
    }

    #[test]
    fn test_is_better_ties_on_impact() {
        let base = trade(dec!(10));
        let calm = with_output(&base, dec!(20), dec!(0.5));
        let rough = with_output(&base, dec!(20), dec!(1.5));

        assert!(calm.is_better(Some(&rough)).unwrap());
        assert!(!rough.is_better(Some(&calm)).unwrap());
        assert!(calm.is_better(Some(&calm.clone())).unwrap());
    }

    #[test]
    fn test_is_better_rejects_incomparable() {
        let a = trade(dec!(10));
        let b = trade(dec!(11));
        assert_eq!(
            a.is_better(Some(&b)).unwrap_err(),
            AmmError::IncomparableTrades("input amounts differ")
        );

        let other_output = Trade {
            output_amount: CurrencyAmount::from_decimal(Currency::new("USDT", 6), dec!(1)).unwrap(),
            ..a.clone()
        };
        assert_eq!(
            a.is_better(Some(&other_output)).unwrap_err(),
            AmmError::IncomparableTrades("output currencies differ")
        );
    }

    #[test]
    fn test_swap_instruction() {
        let trade = trade(dec!(10));
        let instruction = trade.to_swap_instruction(dec!(1)).unwrap();

        assert_eq!(instruction.path.len(), 1);
        assert_eq!(instruction.path[0].pool, lp());
        assert_eq!(instruction.input_amount, trade.input_amount);
        assert!(instruction.minimum_output_amount.raw < trade.output_amount.raw);
    }

    #[test]
    fn test_liquidity_instructions() {
        let pool = Pool::from(standard_pool());
        let amount = CurrencyAmount::from_decimal(ksm(), dec!(10)).unwrap();
        let deposit = LiquidityInstruction::deposit(&pool, &amount).unwrap();
        assert_eq!(deposit.pool, lp());
        assert_eq!(deposit.pooled_currencies[1].to_decimal().unwrap(), dec!(20));

        let burn = CurrencyAmount::from_decimal(lp(), dec!(10)).unwrap();
        let withdrawal = LiquidityInstruction::withdrawal(&pool, &burn).unwrap();
        assert_eq!(withdrawal.pooled_currencies[0].to_decimal().unwrap(), dec!(100));
    }
}
