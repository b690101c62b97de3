//! Bounded recursive best-path search.

use crate::pair::TradingPair;
use crate::path::PathElement;
use crate::trade::{DEFAULT_SAMPLE_DIVISOR, Trade};
use amm_router_domain::error::AmmError;
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::CurrencyAmount;
use tracing::{debug, trace};

/// Default maximum number of hops in a route.
pub const DEFAULT_HOP_LIMIT: usize = 4;

/// Configuration for route searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of hops in a route. Zero finds nothing.
    pub hop_limit: usize,
    /// Input-to-sample ratio for the price-impact estimate.
    pub sample_divisor: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            hop_limit: DEFAULT_HOP_LIMIT,
            sample_divisor: DEFAULT_SAMPLE_DIVISOR,
        }
    }
}

impl RouterConfig {
    /// Sets the hop limit.
    #[must_use]
    pub fn with_hop_limit(mut self, hop_limit: usize) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Sets the sample divisor.
    #[must_use]
    pub fn with_sample_divisor(mut self, sample_divisor: u64) -> Self {
        self.sample_divisor = sample_divisor;
        self
    }
}

/// Finds the best trade across a set of pairs.
#[derive(Debug, Clone, Default)]
pub struct TradeRouter {
    config: RouterConfig,
}

/// Mutable state threaded through one search.
struct Search<'a, P> {
    input: &'a CurrencyAmount,
    target: &'a Currency,
    pairs: &'a [P],
    sample_divisor: u64,
    path: Vec<PathElement>,
    used: Vec<bool>,
    best: Option<Trade>,
}

impl TradeRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Best trade selling `input` for `output_currency`, or `None` when no
    /// route exists within the hop limit.
    ///
    /// A pair is used at most once per route. A zero sample divisor is
    /// rejected before any pair is evaluated.
    pub fn find_best_trade<P: TradingPair>(
        &self,
        input: &CurrencyAmount,
        output_currency: &Currency,
        pairs: &[P],
    ) -> Result<Option<Trade>, AmmError> {
        debug!(
            input = %input,
            output = %output_currency,
            pairs = pairs.len(),
            hop_limit = self.config.hop_limit,
            "Searching for best trade"
        );
        if self.config.sample_divisor == 0 {
            return Err(AmmError::InvalidParameter(
                "sample divisor must be positive".to_string(),
            ));
        }
        if &input.currency == output_currency {
            return Ok(None);
        }

        let mut search = Search {
            input,
            target: output_currency,
            pairs,
            sample_divisor: self.config.sample_divisor,
            path: Vec::with_capacity(self.config.hop_limit),
            used: vec![false; pairs.len()],
            best: None,
        };
        search.extend(input, self.config.hop_limit)?;

        match &search.best {
            Some(trade) => debug!(
                output = %trade.output_amount,
                hops = trade.path.len(),
                price_impact = %trade.price_impact,
                "Best trade found"
            ),
            None => debug!("No route found"),
        }
        Ok(search.best)
    }
}

impl<P: TradingPair> Search<'_, P> {
    fn extend(&mut self, current: &CurrencyAmount, hops_left: usize) -> Result<(), AmmError> {
        if hops_left == 0 {
            return Ok(());
        }

        let pairs = self.pairs;
        for (index, pair) in pairs.iter().enumerate() {
            if self.used[index] || !pair.involves(&current.currency) {
                continue;
            }
            let output = pair.get_output_amount(current)?;
            if output.is_zero() {
                trace!(pair = index, input = %current, "Skipping pair without liquidity");
                continue;
            }
            trace!(pair = index, input = %current, output = %output, "Extending path");

            self.path.push(pair.path_of(&current.currency)?);
            self.used[index] = true;

            let result = if &output.currency == self.target {
                self.consider(output)
            } else {
                self.extend(&output, hops_left - 1)
            };

            self.used[index] = false;
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn consider(&mut self, output: CurrencyAmount) -> Result<(), AmmError> {
        let trade = Trade::with_sample_divisor(
            self.path.clone(),
            self.input.clone(),
            output,
            self.sample_divisor,
        )?;
        if trade.is_better(self.best.as_ref())? {
            self.best = Some(trade);
        }
        Ok(())
    }
}

/// Best trade within `hop_limit` hops, using the default sample divisor.
pub fn find_best_trade<P: TradingPair>(
    input: &CurrencyAmount,
    output_currency: &Currency,
    pairs: &[P],
    hop_limit: usize,
) -> Result<Option<Trade>, AmmError> {
    TradeRouter::new(RouterConfig::default().with_hop_limit(hop_limit))
        .find_best_trade(input, output_currency, pairs)
}
