use amm_router_domain::enums::PoolType;
use amm_router_domain::error::AmmError;
use amm_router_domain::pools::{StableMetaPool, StablePool, StandardPool};
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::CurrencyAmount;
use serde::Serialize;
use std::sync::Arc;

/// One hop of a trade path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// Constant-product pair.
    Standard {
        input: Currency,
        output: Currency,
        pair: Arc<StandardPool>,
    },
    /// Swap between two coins of a plain stable pool.
    StablePlain {
        input: Currency,
        output: Currency,
        pool: Arc<StablePool>,
    },
    /// Swap through a meta pool; `from_base` marks a hop entering from one of
    /// the base pool's underlying coins.
    StableMeta {
        input: Currency,
        output: Currency,
        pool: Arc<StableMetaPool>,
        from_base: bool,
    },
}

impl PathElement {
    pub fn input(&self) -> &Currency {
        match self {
            PathElement::Standard { input, .. }
            | PathElement::StablePlain { input, .. }
            | PathElement::StableMeta { input, .. } => input,
        }
    }

    pub fn output(&self) -> &Currency {
        match self {
            PathElement::Standard { output, .. }
            | PathElement::StablePlain { output, .. }
            | PathElement::StableMeta { output, .. } => output,
        }
    }

    pub fn pool_type(&self) -> PoolType {
        match self {
            PathElement::Standard { .. } => PoolType::Standard,
            PathElement::StablePlain { .. } => PoolType::StablePlain,
            PathElement::StableMeta { .. } => PoolType::StableMeta,
        }
    }

    /// LP token identifying the pool this hop goes through.
    pub fn lp_token(&self) -> &Currency {
        match self {
            PathElement::Standard { pair, .. } => &pair.snapshot().lp_token,
            PathElement::StablePlain { pool, .. } => pool.lp_token(),
            PathElement::StableMeta { pool, .. } => pool.stable_pool().lp_token(),
        }
    }

    /// Amount received from this hop for `input`.
    pub fn output_amount(&self, input: &CurrencyAmount) -> Result<CurrencyAmount, AmmError> {
        input.ensure_currency(self.input())?;
        match self {
            PathElement::Standard { pair, .. } => pair.get_output_amount(input),
            PathElement::StablePlain { pool, output, .. } => pool.get_output_amount(input, output),
            PathElement::StableMeta { .. } => Err(AmmError::UnsupportedHop(
                "meta pool to base pool conversion is not priced",
            )),
        }
    }

    pub fn to_step(&self) -> PathStep {
        PathStep {
            pool_type: self.pool_type(),
            pool: self.lp_token().clone(),
            input: self.input().clone(),
            output: self.output().clone(),
        }
    }
}

/// Runs `input` through every hop of `path` in order.
pub fn path_output(path: &[PathElement], input: &CurrencyAmount) -> Result<CurrencyAmount, AmmError> {
    path.iter()
        .try_fold(input.clone(), |amount, hop| hop.output_amount(&amount))
}

/// Encoder-facing description of one hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub pool_type: PoolType,
    pub pool: Currency,
    pub input: Currency,
    pub output: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_router_domain::pool::PoolSnapshot;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn amount(ticker: &str, value: Decimal) -> CurrencyAmount {
        CurrencyAmount::from_decimal(Currency::new(ticker, 12), value).unwrap()
    }

    fn pair(a: &str, b: &str, ra: Decimal, rb: Decimal) -> Arc<StandardPool> {
        let lp = Currency::standard_lp(format!("LP-{a}-{b}"), 12);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            vec![amount(a, ra), amount(b, rb)],
            dec!(0.003),
            CurrencyAmount::from_decimal(lp, dec!(100)).unwrap(),
            vec![],
        )
        .unwrap();
        Arc::new(StandardPool::new(snapshot, true).unwrap())
    }

    fn hop(a: &str, b: &str, pool: Arc<StandardPool>) -> PathElement {
        PathElement::Standard {
            input: Currency::new(a, 12),
            output: Currency::new(b, 12),
            pair: pool,
        }
    }

    #[test]
    fn test_path_output_chains_hops() {
        let first = pair("KSM", "KBTC", dec!(1000), dec!(1000));
        let second = pair("KBTC", "USDT", dec!(1000), dec!(1000));
        let path = vec![hop("KSM", "KBTC", first.clone()), hop("KBTC", "USDT", second.clone())];

        let input = amount("KSM", dec!(10));
        let intermediate = first.get_output_amount(&input).unwrap();
        let expected = second.get_output_amount(&intermediate).unwrap();

        assert_eq!(path_output(&path, &input).unwrap(), expected);
        assert_eq!(path_output(&[], &input).unwrap(), input);
    }

    #[test]
    fn test_hop_rejects_wrong_input() {
        let path = hop("KSM", "KBTC", pair("KSM", "KBTC", dec!(1000), dec!(1000)));
        assert!(matches!(
            path.output_amount(&amount("KBTC", dec!(1))),
            Err(AmmError::UnexpectedCurrency { .. })
        ));
    }

    #[test]
    fn test_step_describes_hop() {
        let path = hop("KSM", "KBTC", pair("KSM", "KBTC", dec!(1000), dec!(1000)));
        let step = path.to_step();
        assert_eq!(step.pool_type, PoolType::Standard);
        assert_eq!(step.pool.ticker, "LP-KSM-KBTC");
        assert_eq!(step.output.ticker, "KBTC");
    }

    fn stable(pool_id: u32, coins: Vec<CurrencyAmount>) -> StablePool {
        let lp = Currency::stable_lp(format!("LP-STABLE-{pool_id}"), 12, pool_id);
        let snapshot = PoolSnapshot::new(
            lp.clone(),
            coins,
            dec!(0.0004),
            CurrencyAmount::from_decimal(lp, dec!(2000)).unwrap(),
            vec![],
        )
        .unwrap();
        StablePool::new(pool_id, snapshot, 100).unwrap()
    }

    #[test]
    fn test_stable_and_meta_hops() {
        let base = Arc::new(stable(
            0,
            vec![amount("USDT", dec!(1000)), amount("USDC", dec!(1000))],
        ));
        let plain = PathElement::StablePlain {
            input: Currency::new("USDT", 12),
            output: Currency::new("USDC", 12),
            pool: base.clone(),
        };
        let out = plain.output_amount(&amount("USDT", dec!(1))).unwrap();
        assert_eq!(out.currency.ticker, "USDC");
        assert!(out.to_decimal().unwrap() > dec!(0.99));

        let base_lp = CurrencyAmount::from_decimal(base.lp_token().clone(), dec!(1000)).unwrap();
        let meta = StableMetaPool::new(
            stable(1, vec![amount("KUSD", dec!(1000)), base_lp]),
            base.clone(),
        )
        .unwrap();
        let hop = PathElement::StableMeta {
            input: Currency::new("USDT", 12),
            output: Currency::new("KUSD", 12),
            pool: Arc::new(meta),
            from_base: true,
        };
        assert!(matches!(
            hop.output_amount(&amount("USDT", dec!(1))),
            Err(AmmError::UnsupportedHop(_))
        ));
        assert_eq!(hop.lp_token().ticker, "LP-STABLE-1");
    }
}
