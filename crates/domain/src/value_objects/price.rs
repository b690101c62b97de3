use crate::error::AmmError;
use crate::value_objects::amount::CurrencyAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Units of the quote currency paid per unit of the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// `quote / base` in human units; zero when `base` is zero.
    pub fn from_amounts(base: &CurrencyAmount, quote: &CurrencyAmount) -> Result<Self, AmmError> {
        let base = base.to_decimal()?;
        if base.is_zero() {
            return Ok(Self::new(Decimal::ZERO));
        }
        let value = quote
            .to_decimal()?
            .checked_div(base)
            .ok_or(AmmError::Overflow("Price::from_amounts"))?;
        Ok(Self::new(value))
    }

    pub fn invert(&self) -> Self {
        if self.value.is_zero() {
            return Self {
                value: Decimal::ZERO,
            };
        }
        Self {
            value: Decimal::ONE / self.value,
        }
    }
}
