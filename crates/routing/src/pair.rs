use crate::path::PathElement;
use amm_router_domain::error::AmmError;
use amm_router_domain::pool::Pool;
use amm_router_domain::pools::StandardPool;
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::CurrencyAmount;
use std::sync::Arc;

/// A two-sided market the router can traverse.
pub trait TradingPair {
    fn token0(&self) -> &Currency;
    fn token1(&self) -> &Currency;
    fn get_output_amount(&self, input: &CurrencyAmount) -> Result<CurrencyAmount, AmmError>;
    /// Hop selling `input` through this pair.
    fn path_of(&self, input: &Currency) -> Result<PathElement, AmmError>;

    fn involves(&self, currency: &Currency) -> bool {
        self.token0() == currency || self.token1() == currency
    }
}

impl TradingPair for Arc<StandardPool> {
    fn token0(&self) -> &Currency {
        StandardPool::token0(self)
    }

    fn token1(&self) -> &Currency {
        StandardPool::token1(self)
    }

    fn get_output_amount(&self, input: &CurrencyAmount) -> Result<CurrencyAmount, AmmError> {
        StandardPool::get_output_amount(self, input)
    }

    fn path_of(&self, input: &Currency) -> Result<PathElement, AmmError> {
        let output = self.other_token(input)?.clone();
        Ok(PathElement::Standard {
            input: input.clone(),
            output,
            pair: Arc::clone(self),
        })
    }
}

/// Pools the router can use as pairs: standard pools that are trading.
///
/// Stable pools are not converted; routing through them is not supported yet.
pub fn trading_pairs(pools: &[Pool]) -> Vec<Arc<StandardPool>> {
    pools
        .iter()
        .filter_map(|pool| match pool {
            Pool::Standard(pair) if pair.is_trading_active() => Some(Arc::new(pair.clone())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_router_domain::pool::PoolSnapshot;
    use amm_router_domain::pools::StablePool;
    use rust_decimal_macros::dec;

    fn amount(ticker: &str) -> CurrencyAmount {
        CurrencyAmount::from_decimal(Currency::new(ticker, 12), dec!(1000)).unwrap()
    }

    fn standard(a: &str, b: &str, active: bool) -> Pool {
        let lp = Currency::standard_lp(format!("LP-{a}-{b}"), 12);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            vec![amount(a), amount(b)],
            dec!(0.003),
            CurrencyAmount::from_decimal(lp, dec!(1000)).unwrap(),
            vec![],
        )
        .unwrap();
        Pool::from(StandardPool::new(snapshot, active).unwrap())
    }

    fn stable() -> Pool {
        let lp = Currency::stable_lp("LP-USD", 12, 0);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            vec![amount("USDT"), amount("USDC")],
            dec!(0.0004),
            CurrencyAmount::from_decimal(lp, dec!(2000)).unwrap(),
            vec![],
        )
        .unwrap();
        Pool::from(StablePool::new(0, snapshot, 100).unwrap())
    }

    #[test]
    fn test_only_active_standard_pools_become_pairs() {
        let pools = vec![
            standard("KSM", "KBTC", true),
            standard("KSM", "KINT", false),
            stable(),
        ];
        let pairs = trading_pairs(&pools);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].token1().ticker, "KBTC");
    }

    #[test]
    fn test_path_of_points_to_other_token() {
        let pairs = trading_pairs(&[standard("KSM", "KBTC", true)]);
        let pair = &pairs[0];
        let hop = pair.path_of(&Currency::new("KBTC", 12)).unwrap();

        assert_eq!(hop.input().ticker, "KBTC");
        assert_eq!(hop.output().ticker, "KSM");
        assert!(pair.involves(&Currency::new("KSM", 12)));
        assert!(pair.path_of(&Currency::new("USDT", 12)).is_err());
    }
}
