use crate::error::AmmError;
use crate::pools::stable::StablePool;
use crate::value_objects::amount::CurrencyAmount;
use std::sync::Arc;

/// A stable pool holding another stable pool's LP token as one of its coins.
///
/// The invariant math runs on the meta pool's own coins, LP token included.
/// Conversions between that LP coin and the base pool's underlying coins are
/// not priced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableMetaPool {
    pool: StablePool,
    base_pool: Arc<StablePool>,
}

impl StableMetaPool {
    pub fn new(pool: StablePool, base_pool: Arc<StablePool>) -> Result<Self, AmmError> {
        if pool.token_index(base_pool.lp_token()).is_err() {
            return Err(AmmError::InvalidParameter(format!(
                "meta pool {} does not hold base LP token {}",
                pool.pool_id(),
                base_pool.lp_token()
            )));
        }
        Ok(Self { pool, base_pool })
    }

    /// The underlying stable pool, for swaps between the meta pool's own coins.
    pub fn stable_pool(&self) -> &StablePool {
        &self.pool
    }

    pub fn base_pool(&self) -> &Arc<StablePool> {
        &self.base_pool
    }

    /// Position of the base pool's LP token among the meta pool's coins.
    pub fn base_lp_index(&self) -> Result<usize, AmmError> {
        self.pool.token_index(self.base_pool.lp_token())
    }

    pub fn actually_pooled_currencies(&self) -> &[CurrencyAmount] {
        self.pool.actually_pooled_currencies()
    }

    /// Display-facing reserves with the base LP coin replaced by the base
    /// pool's own reserves.
    pub fn pooled_currencies(&self) -> Vec<CurrencyAmount> {
        let base_lp = self.base_pool.lp_token();
        self.actually_pooled_currencies()
            .iter()
            .flat_map(|amount| {
                if &amount.currency == base_lp {
                    self.base_pool.actually_pooled_currencies().to_vec()
                } else {
                    vec![amount.clone()]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolSnapshot;
    use crate::token::Currency;
    use rust_decimal_macros::dec;

    fn amount(currency: &Currency, value: rust_decimal::Decimal) -> CurrencyAmount {
        CurrencyAmount::from_decimal(currency.clone(), value).unwrap()
    }

    fn base_pool() -> StablePool {
        let lp = Currency::stable_lp("LP-USD", 18, 0);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            vec![
                amount(&Currency::new("USDT", 6), dec!(1000)),
                amount(&Currency::new("USDC", 6), dec!(1200)),
            ],
            dec!(0.0004),
            amount(&lp, dec!(2200)),
            vec![],
        )
        .unwrap();
        StablePool::new(0, snapshot, 200).unwrap()
    }

    fn meta_pool(base: &StablePool) -> StablePool {
        let lp = Currency::stable_lp("LP-META", 18, 1);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            vec![
                amount(&Currency::new("KUSD", 12), dec!(500)),
                amount(base.lp_token(), dec!(480)),
            ],
            dec!(0.0004),
            amount(&lp, dec!(980)),
            vec![],
        )
        .unwrap();
        StablePool::new(1, snapshot, 200).unwrap()
    }

    #[test]
    fn test_pooled_currencies_substitutes_base_coins() {
        let base = Arc::new(base_pool());
        let meta = StableMetaPool::new(meta_pool(&base), base.clone()).unwrap();

        let tickers: Vec<_> = meta
            .pooled_currencies()
            .iter()
            .map(|amount| amount.currency.ticker.clone())
            .collect();
        assert_eq!(tickers, vec!["KUSD", "USDT", "USDC"]);
        assert_eq!(meta.actually_pooled_currencies().len(), 2);
        assert_eq!(meta.base_lp_index().unwrap(), 1);
    }

    #[test]
    fn test_requires_base_lp_coin() {
        let base = Arc::new(base_pool());
        let unrelated = (*base).clone();
        assert!(matches!(
            StableMetaPool::new(unrelated, base),
            Err(AmmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_swaps_between_own_coins() {
        let base = Arc::new(base_pool());
        let meta = StableMetaPool::new(meta_pool(&base), base.clone()).unwrap();
        let input = amount(&Currency::new("KUSD", 12), dec!(10));

        let out = meta
            .stable_pool()
            .get_output_amount(&input, base.lp_token())
            .unwrap();
        assert_eq!(&out.currency, base.lp_token());
        assert!(out.to_decimal().unwrap() > dec!(9.9));
    }
}
