//! JSON pool snapshot files.
//!
//! Amounts are human decimal strings; LP tokens are resolved by ticker so a
//! meta pool can list its base pool's LP token as an ordinary reserve.

use amm_router_domain::pool::{Pool, PoolSnapshot};
use amm_router_domain::pools::{StableMetaPool, StablePool, StandardPool};
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::CurrencyAmount;
use anyhow::{Context, Result, anyhow, bail};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Standard,
    Stable,
    StableMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyEntry {
    pub ticker: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountEntry {
    pub ticker: String,
    pub decimals: u8,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolEntry {
    #[serde(rename = "type")]
    pub kind: PoolKind,
    /// Required for stable pools.
    pub pool_id: Option<u32>,
    /// Required for meta pools.
    pub base_pool_id: Option<u32>,
    pub amplification_coefficient: Option<u64>,
    #[serde(default = "default_trading_active")]
    pub is_trading_active: bool,
    pub lp_token: CurrencyEntry,
    pub reserves: Vec<AmountEntry>,
    pub trading_fee: Decimal,
    pub total_supply: Decimal,
    #[serde(default)]
    pub yearly_rewards: Vec<AmountEntry>,
}

fn default_trading_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub pools: Vec<PoolEntry>,
}

impl SnapshotFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool snapshot {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse pool snapshot {}", path.display()))
    }

    /// Fails when one ticker is listed with different decimals.
    fn check_tickers(&self) -> Result<()> {
        let mut decimals = HashMap::new();
        for entry in &self.pools {
            let lp_token = (&entry.lp_token.ticker, entry.lp_token.decimals);
            let amounts = entry
                .reserves
                .iter()
                .chain(&entry.yearly_rewards)
                .map(|amount| (&amount.ticker, amount.decimals));
            for (ticker, places) in std::iter::once(lp_token).chain(amounts) {
                match decimals.insert(ticker.as_str(), places) {
                    Some(previous) if previous != places => {
                        bail!("Ticker {ticker} is listed with {previous} and {places} decimals")
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Builds validated pools, plain stable pools first so meta pools can
    /// reference them.
    pub fn into_pools(self) -> Result<Vec<Pool>> {
        self.check_tickers()?;
        let lp_tokens = self
            .pools
            .iter()
            .map(|entry| Ok((entry.lp_token.ticker.clone(), lp_currency(entry)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut stable_pools = HashMap::new();
        for entry in self.pools.iter().filter(|e| e.kind == PoolKind::Stable) {
            let pool = stable_pool(entry, &lp_tokens)?;
            if stable_pools.insert(pool.pool_id(), Arc::new(pool)).is_some() {
                bail!("Duplicate stable pool id in snapshot");
            }
        }

        self.pools
            .iter()
            .map(|entry| {
                let pool = match entry.kind {
                    PoolKind::Standard => Pool::from(StandardPool::new(
                        snapshot(entry, &lp_tokens)?,
                        entry.is_trading_active,
                    )?),
                    PoolKind::Stable => {
                        let id = required(entry.pool_id, "pool_id", entry)?;
                        let pool = stable_pools
                            .get(&id)
                            .ok_or_else(|| anyhow!("Unknown stable pool {id}"))?;
                        Pool::from(StablePool::clone(pool))
                    }
                    PoolKind::StableMeta => {
                        let base_id = required(entry.base_pool_id, "base_pool_id", entry)?;
                        let base = stable_pools
                            .get(&base_id)
                            .ok_or_else(|| anyhow!("Unknown base pool {base_id}"))?;
                        Pool::from(StableMetaPool::new(
                            stable_pool(entry, &lp_tokens)?,
                            Arc::clone(base),
                        )?)
                    }
                };
                Ok(pool)
            })
            .collect()
    }
}

fn required<T>(value: Option<T>, field: &str, entry: &PoolEntry) -> Result<T> {
    value.ok_or_else(|| anyhow!("Pool {} is missing {field}", entry.lp_token.ticker))
}

fn lp_currency(entry: &PoolEntry) -> Result<Currency> {
    let CurrencyEntry { ticker, decimals } = entry.lp_token.clone();
    Ok(match entry.kind {
        PoolKind::Standard => Currency::standard_lp(ticker, decimals),
        PoolKind::Stable | PoolKind::StableMeta => {
            let pool_id = required(entry.pool_id, "pool_id", entry)?;
            Currency::stable_lp(ticker, decimals, pool_id)
        }
    })
}

fn amount(entry: &AmountEntry, lp_tokens: &HashMap<String, Currency>) -> Result<CurrencyAmount> {
    let currency = lp_tokens
        .get(&entry.ticker)
        .cloned()
        .unwrap_or_else(|| Currency::new(entry.ticker.clone(), entry.decimals));
    Ok(CurrencyAmount::from_decimal(currency, entry.amount)?)
}

fn snapshot(entry: &PoolEntry, lp_tokens: &HashMap<String, Currency>) -> Result<PoolSnapshot> {
    let amounts = |entries: &[AmountEntry]| {
        entries
            .iter()
            .map(|e| amount(e, lp_tokens))
            .collect::<Result<Vec<_>>>()
    };
    let lp_token = lp_currency(entry)?;
    let total_supply = CurrencyAmount::from_decimal(lp_token.clone(), entry.total_supply)?;
    let snapshot = PoolSnapshot::new(
        lp_token,
        amounts(&entry.reserves)?,
        entry.trading_fee,
        total_supply,
        amounts(&entry.yearly_rewards)?,
    )
    .with_context(|| format!("Invalid pool {}", entry.lp_token.ticker))?;
    Ok(snapshot)
}

fn stable_pool(entry: &PoolEntry, lp_tokens: &HashMap<String, Currency>) -> Result<StablePool> {
    let pool_id = required(entry.pool_id, "pool_id", entry)?;
    let amp = required(entry.amplification_coefficient, "amplification_coefficient", entry)?;
    Ok(StablePool::new(pool_id, snapshot(entry, lp_tokens)?, amp)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_router_domain::enums::PoolType;

    const SNAPSHOT: &str = r#"{
        "pools": [
            {
                "type": "standard",
                "lp_token": { "ticker": "LP-KSM-KBTC", "decimals": 12 },
                "reserves": [
                    { "ticker": "KSM", "decimals": 12, "amount": "1000" },
                    { "ticker": "KBTC", "decimals": 8, "amount": "2.5" }
                ],
                "trading_fee": "0.003",
                "total_supply": "50"
            },
            {
                "type": "stable_meta",
                "pool_id": 1,
                "base_pool_id": 0,
                "amplification_coefficient": 200,
                "lp_token": { "ticker": "LP-META", "decimals": 18 },
                "reserves": [
                    { "ticker": "KUSD", "decimals": 12, "amount": "500" },
                    { "ticker": "LP-USD", "decimals": 18, "amount": "480" }
                ],
                "trading_fee": "0.0004",
                "total_supply": "980"
            },
            {
                "type": "stable",
                "pool_id": 0,
                "amplification_coefficient": 100,
                "lp_token": { "ticker": "LP-USD", "decimals": 18 },
                "reserves": [
                    { "ticker": "USDT", "decimals": 6, "amount": "1000" },
                    { "ticker": "USDC", "decimals": 6, "amount": "1000" }
                ],
                "trading_fee": "0.0004",
                "total_supply": "2000",
                "yearly_rewards": [{ "ticker": "KINT", "decimals": 12, "amount": "10" }]
            }
        ]
    }"#;

    #[test]
    fn test_parses_all_pool_types() {
        let file: SnapshotFile = serde_json::from_str(SNAPSHOT).unwrap();
        let pools = file.into_pools().unwrap();

        let types: Vec<_> = pools.iter().map(Pool::pool_type).collect();
        assert_eq!(
            types,
            vec![PoolType::Standard, PoolType::StableMeta, PoolType::StablePlain]
        );
        assert_eq!(pools[1].pooled_currencies().len(), 3);
        assert_eq!(pools[2].snapshot().yearly_rewards.len(), 1);
    }

    #[test]
    fn test_missing_base_pool_is_an_error() {
        let mut file: SnapshotFile = serde_json::from_str(SNAPSHOT).unwrap();
        file.pools.retain(|entry| entry.kind != PoolKind::Stable);
        assert!(file.into_pools().is_err());
    }

    #[test]
    fn test_conflicting_ticker_decimals_are_an_error() {
        let mut file: SnapshotFile = serde_json::from_str(SNAPSHOT).unwrap();
        let reward = &mut file.pools[2].yearly_rewards[0];
        reward.ticker = "KSM".to_string();
        reward.decimals = 10;

        let err = file.into_pools().unwrap_err();
        assert!(err.to_string().contains("KSM"));
    }

    #[test]
    fn test_missing_amplification_is_an_error() {
        let mut file: SnapshotFile = serde_json::from_str(SNAPSHOT).unwrap();
        file.pools[2].amplification_coefficient = None;
        assert!(file.into_pools().is_err());
    }
}
