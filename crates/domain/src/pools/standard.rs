use crate::error::AmmError;
use crate::math::constant_product::{calculate_out_amount, calculate_spot_price};
use crate::pool::PoolSnapshot;
use crate::token::{Currency, CurrencyKind};
use crate::value_objects::amount::CurrencyAmount;
use crate::value_objects::price::Price;
use serde::Serialize;

/// Two-asset constant-product pool with an input-side fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardPool {
    snapshot: PoolSnapshot,
    /// False while the pool is bootstrapping. Not enforced here; callers
    /// check it before trading.
    is_trading_active: bool,
}

impl StandardPool {
    pub fn new(snapshot: PoolSnapshot, is_trading_active: bool) -> Result<Self, AmmError> {
        snapshot.validate()?;
        if snapshot.size() != 2 {
            return Err(AmmError::PoolSizeMismatch {
                expected: 2,
                actual: snapshot.size(),
            });
        }
        if snapshot.lp_token.kind != CurrencyKind::StandardLpToken {
            return Err(AmmError::InvalidParameter(format!(
                "{} is not a standard LP token",
                snapshot.lp_token
            )));
        }
        Ok(Self {
            snapshot,
            is_trading_active,
        })
    }

    pub fn snapshot(&self) -> &PoolSnapshot {
        &self.snapshot
    }

    pub fn is_trading_active(&self) -> bool {
        self.is_trading_active
    }

    pub fn reserve0(&self) -> &CurrencyAmount {
        &self.snapshot.pooled_currencies[0]
    }

    pub fn reserve1(&self) -> &CurrencyAmount {
        &self.snapshot.pooled_currencies[1]
    }

    pub fn token0(&self) -> &Currency {
        &self.reserve0().currency
    }

    pub fn token1(&self) -> &Currency {
        &self.reserve1().currency
    }

    pub fn involves(&self, currency: &Currency) -> bool {
        self.token0() == currency || self.token1() == currency
    }

    /// Returns `(reserve_in, reserve_out)` for a trade selling `currency`.
    fn reserves_for(
        &self,
        currency: &Currency,
    ) -> Result<(&CurrencyAmount, &CurrencyAmount), AmmError> {
        if currency == self.token0() {
            Ok((self.reserve0(), self.reserve1()))
        } else if currency == self.token1() {
            Ok((self.reserve1(), self.reserve0()))
        } else {
            Err(AmmError::CurrencyNotInPool(currency.ticker.clone()))
        }
    }

    /// The token received when selling `currency`.
    pub fn other_token(&self, currency: &Currency) -> Result<&Currency, AmmError> {
        let (_, reserve_out) = self.reserves_for(currency)?;
        Ok(&reserve_out.currency)
    }

    /// Output of selling `input`; zero while either reserve is empty.
    pub fn get_output_amount(&self, input: &CurrencyAmount) -> Result<CurrencyAmount, AmmError> {
        let (reserve_in, reserve_out) = self.reserves_for(&input.currency)?;
        let raw = calculate_out_amount(
            input.raw,
            reserve_in.raw,
            reserve_out.raw,
            self.snapshot.trading_fee,
        )?;
        Ok(reserve_out.with_raw(raw))
    }

    /// Marginal price of `currency` in units of the other token, fee excluded.
    pub fn spot_price(&self, currency: &Currency) -> Result<Price, AmmError> {
        let (reserve_in, reserve_out) = self.reserves_for(currency)?;
        let value = calculate_spot_price(
            reserve_in.raw,
            reserve_in.currency.decimals,
            reserve_out.raw,
            reserve_out.currency.decimals,
        )?;
        Ok(Price::new(value))
    }
}
