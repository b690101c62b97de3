use serde::{Deserialize, Serialize};
use std::fmt;

/// What a currency represents: a plain asset or a pool's share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    Token,
    /// Shares of a two-asset constant-product pool.
    StandardLpToken,
    /// Shares of the stable pool with the given id.
    StableLpToken { pool_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub ticker: String,
    pub decimals: u8,
    pub kind: CurrencyKind,
}

impl Currency {
    pub fn new(ticker: impl Into<String>, decimals: u8) -> Self {
        Self {
            ticker: ticker.into(),
            decimals,
            kind: CurrencyKind::Token,
        }
    }

    pub fn standard_lp(ticker: impl Into<String>, decimals: u8) -> Self {
        Self {
            ticker: ticker.into(),
            decimals,
            kind: CurrencyKind::StandardLpToken,
        }
    }

    pub fn stable_lp(ticker: impl Into<String>, decimals: u8, pool_id: u32) -> Self {
        Self {
            ticker: ticker.into(),
            decimals,
            kind: CurrencyKind::StableLpToken { pool_id },
        }
    }

    pub fn is_lp_token(&self) -> bool {
        !matches!(self.kind, CurrencyKind::Token)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lp_token_kinds() {
        let ksm = Currency::new("KSM", 12);
        let lp = Currency::standard_lp("LP-KSM-KBTC", 18);
        let stable_lp = Currency::stable_lp("LP-STABLE-0", 18, 0);

        assert!(!ksm.is_lp_token());
        assert!(lp.is_lp_token());
        assert_eq!(stable_lp.kind, CurrencyKind::StableLpToken { pool_id: 0 });
        assert_ne!(lp, Currency::new("LP-KSM-KBTC", 18));
    }
}
