//! Pool snapshots and the pool sum type.
//!
//! A snapshot is an immutable value produced by the chain-state reader for one
//! query. Nothing here mutates it; every calculation recomputes from the
//! supplied reserves.

use crate::enums::PoolType;
use crate::error::AmmError;
use crate::liquidity;
use crate::math::fixed_point::check_decimals;
use crate::pools::{StableMetaPool, StablePool, StandardPool};
use crate::token::Currency;
use crate::value_objects::amount::CurrencyAmount;
use rust_decimal::Decimal;
use serde::Serialize;

/// Fields every pool variant carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub lp_token: Currency,
    /// Reserves in pool order; for stable pools the index is the coin position.
    pub pooled_currencies: Vec<CurrencyAmount>,
    /// Fraction in [0, 1).
    pub trading_fee: Decimal,
    pub total_supply: CurrencyAmount,
    /// Informational only.
    pub yearly_rewards: Vec<CurrencyAmount>,
}

impl PoolSnapshot {
    /// Validates the common fields.
    pub fn new(
        lp_token: Currency,
        pooled_currencies: Vec<CurrencyAmount>,
        trading_fee: Decimal,
        total_supply: CurrencyAmount,
        yearly_rewards: Vec<CurrencyAmount>,
    ) -> Result<Self, AmmError> {
        let snapshot = Self {
            lp_token,
            pooled_currencies,
            trading_fee,
            total_supply,
            yearly_rewards,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the fee range, the supply currency and currency decimals, and
    /// that no reserve currency repeats. Pool constructors run it again on
    /// the snapshot they receive.
    pub fn validate(&self) -> Result<(), AmmError> {
        let trading_fee = self.trading_fee;
        if trading_fee.is_sign_negative() || trading_fee >= Decimal::ONE {
            return Err(AmmError::InvalidParameter(format!(
                "trading fee {trading_fee} outside [0, 1)"
            )));
        }
        self.total_supply.ensure_currency(&self.lp_token)?;
        check_decimals(self.lp_token.decimals)?;
        for (i, amount) in self.pooled_currencies.iter().enumerate() {
            check_decimals(amount.currency.decimals)?;
            if self.pooled_currencies[..i]
                .iter()
                .any(|other| other.currency == amount.currency)
            {
                return Err(AmmError::DuplicateCurrency(amount.currency.ticker.clone()));
            }
        }
        Ok(())
    }

    /// True when any reserve or the LP supply is zero.
    pub fn is_empty(&self) -> bool {
        self.total_supply.is_zero() || self.pooled_currencies.iter().any(CurrencyAmount::is_zero)
    }

    pub fn index_of(&self, currency: &Currency) -> Result<usize, AmmError> {
        self.pooled_currencies
            .iter()
            .position(|amount| &amount.currency == currency)
            .ok_or_else(|| AmmError::CurrencyNotInPool(currency.ticker.clone()))
    }

    pub fn reserve_of(&self, currency: &Currency) -> Result<&CurrencyAmount, AmmError> {
        let index = self.index_of(currency)?;
        Ok(&self.pooled_currencies[index])
    }

    pub fn size(&self) -> usize {
        self.pooled_currencies.len()
    }
}

/// Any pool the engine can price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pool {
    Standard(StandardPool),
    StablePlain(StablePool),
    StableMeta(StableMetaPool),
}

impl Pool {
    pub fn pool_type(&self) -> PoolType {
        match self {
            Pool::Standard(_) => PoolType::Standard,
            Pool::StablePlain(_) => PoolType::StablePlain,
            Pool::StableMeta(_) => PoolType::StableMeta,
        }
    }

    /// Snapshot whose reserves enter the pool math.
    pub fn snapshot(&self) -> &PoolSnapshot {
        match self {
            Pool::Standard(pool) => pool.snapshot(),
            Pool::StablePlain(pool) => pool.snapshot(),
            Pool::StableMeta(pool) => pool.stable_pool().snapshot(),
        }
    }

    pub fn lp_token(&self) -> &Currency {
        &self.snapshot().lp_token
    }

    pub fn trading_fee(&self) -> Decimal {
        self.snapshot().trading_fee
    }

    pub fn total_supply(&self) -> &CurrencyAmount {
        &self.snapshot().total_supply
    }

    /// Display-facing reserves; meta pools list the base pool's coins in place
    /// of its LP token.
    pub fn pooled_currencies(&self) -> Vec<CurrencyAmount> {
        match self {
            Pool::StableMeta(pool) => pool.pooled_currencies(),
            _ => self.snapshot().pooled_currencies.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn deposit_input_amounts(
        &self,
        amount: &CurrencyAmount,
    ) -> Result<Vec<CurrencyAmount>, AmmError> {
        liquidity::deposit_input_amounts(self.snapshot(), amount)
    }

    pub fn deposit_lp_token_amount(&self, amount: &CurrencyAmount) -> Result<CurrencyAmount, AmmError> {
        liquidity::deposit_lp_token_amount(self.snapshot(), amount)
    }

    pub fn withdrawal_pooled_currency_amounts(
        &self,
        lp_amount: &CurrencyAmount,
    ) -> Result<Vec<CurrencyAmount>, AmmError> {
        liquidity::withdrawal_pooled_currency_amounts(self.snapshot(), lp_amount)
    }
}

impl From<StandardPool> for Pool {
    fn from(pool: StandardPool) -> Self {
        Pool::Standard(pool)
    }
}

impl From<StablePool> for Pool {
    fn from(pool: StablePool) -> Self {
        Pool::StablePlain(pool)
    }
}

impl From<StableMetaPool> for Pool {
    fn from(pool: StableMetaPool) -> Self {
        Pool::StableMeta(pool)
    }
}
