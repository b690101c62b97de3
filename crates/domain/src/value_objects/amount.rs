use crate::error::AmmError;
use crate::math::fixed_point::{decimal_to_raw, mul_fraction, raw_to_decimal};
use crate::token::Currency;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exact amount of a currency, held in atomic units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub raw: U256,
}

impl CurrencyAmount {
    pub fn new(currency: Currency, raw: impl Into<U256>) -> Self {
        Self {
            currency,
            raw: raw.into(),
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            currency,
            raw: U256::zero(),
        }
    }

    /// Builds an amount from human units, truncating below one atomic unit.
    pub fn from_decimal(currency: Currency, value: Decimal) -> Result<Self, AmmError> {
        let raw = decimal_to_raw(value, currency.decimals)?;
        Ok(Self { currency, raw })
    }

    pub fn to_decimal(&self) -> Result<Decimal, AmmError> {
        raw_to_decimal(self.raw, self.currency.decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Same currency, different atomic amount.
    pub fn with_raw(&self, raw: U256) -> Self {
        Self {
            currency: self.currency.clone(),
            raw,
        }
    }

    /// Multiplies by a non-negative fraction, flooring to the atomic unit.
    pub fn mul_fraction(&self, fraction: Decimal) -> Result<Self, AmmError> {
        Ok(self.with_raw(mul_fraction(self.raw, fraction)?))
    }

    pub fn checked_add(&self, other: &CurrencyAmount) -> Result<Self, AmmError> {
        self.ensure_same_currency(other)?;
        let raw = self
            .raw
            .checked_add(other.raw)
            .ok_or(AmmError::Overflow("CurrencyAmount::checked_add"))?;
        Ok(self.with_raw(raw))
    }

    pub fn checked_sub(&self, other: &CurrencyAmount) -> Result<Self, AmmError> {
        self.ensure_same_currency(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or_else(|| {
            AmmError::InsufficientLiquidity(format!("{other} exceeds {self}"))
        })?;
        Ok(self.with_raw(raw))
    }

    pub fn ensure_same_currency(&self, other: &CurrencyAmount) -> Result<(), AmmError> {
        self.ensure_currency(&other.currency)
    }

    pub fn ensure_currency(&self, currency: &Currency) -> Result<(), AmmError> {
        if &self.currency != currency {
            return Err(AmmError::UnexpectedCurrency {
                expected: currency.ticker.clone(),
                actual: self.currency.ticker.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{} {}", value.normalize(), self.currency),
            Err(_) => write!(f, "{} (raw) {}", self.raw, self.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_and_to_decimal() {
        let kbtc = Currency::new("KBTC", 8);
        let amount = CurrencyAmount::from_decimal(kbtc.clone(), dec!(0.12345678)).unwrap();
        assert_eq!(amount.raw, U256::from(12_345_678u64));
        assert_eq!(amount.to_decimal().unwrap(), dec!(0.12345678));
        assert_eq!(amount.to_string(), "0.12345678 KBTC");
    }

    #[test]
    fn test_from_decimal_rejects_wide_decimals() {
        let wide = Currency::new("WIDE", 90);
        assert!(matches!(
            CurrencyAmount::from_decimal(wide, Decimal::ONE),
            Err(AmmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_arithmetic_checks_currency() {
        let ksm = Currency::new("KSM", 12);
        let kint = Currency::new("KINT", 12);
        let a = CurrencyAmount::from_decimal(ksm.clone(), dec!(2)).unwrap();
        let b = CurrencyAmount::from_decimal(ksm, dec!(0.5)).unwrap();
        let c = CurrencyAmount::from_decimal(kint, dec!(1)).unwrap();

        assert_eq!(a.checked_sub(&b).unwrap().to_decimal().unwrap(), dec!(1.5));
        assert!(matches!(
            a.checked_add(&c),
            Err(AmmError::UnexpectedCurrency { .. })
        ));
        assert!(matches!(
            b.checked_sub(&a),
            Err(AmmError::InsufficientLiquidity(_))
        ));
    }

    #[test]
    fn test_mul_fraction() {
        let usdt = Currency::new("USDT", 6);
        let amount = CurrencyAmount::from_decimal(usdt, dec!(100)).unwrap();
        let out = amount.mul_fraction(dec!(0.995)).unwrap();
        assert_eq!(out.to_decimal().unwrap(), dec!(99.5));
    }
}
