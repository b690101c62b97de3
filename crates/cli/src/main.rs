//! Command Line Interface for the AMM router.
mod snapshot;

use amm_router_domain::pool::Pool;
use amm_router_domain::token::Currency;
use amm_router_domain::value_objects::CurrencyAmount;
use amm_router_routing::pair::trading_pairs;
use amm_router_routing::router::{DEFAULT_HOP_LIMIT, RouterConfig, TradeRouter};
use amm_router_routing::trade::{LiquidityInstruction, SwapInstruction};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use serde::Serialize;
use snapshot::SnapshotFile;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "amm-router")]
#[command(about = "AMM pricing and trade routing CLI", long_about = None)]
struct Cli {
    /// Pool snapshot file (JSON)
    #[arg(short, long, env = "AMM_ROUTER_POOLS", default_value = "pools.json")]
    pools: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pools in the snapshot
    Pools,
    /// Quote the best trade between two currencies
    Quote {
        /// Ticker of the currency to sell
        #[arg(long)]
        from: String,

        /// Ticker of the currency to buy
        #[arg(long)]
        to: String,

        /// Amount to sell, in whole units
        #[arg(short, long)]
        amount: Decimal,

        /// Maximum number of hops
        #[arg(long, env = "AMM_ROUTER_HOP_LIMIT", default_value_t = DEFAULT_HOP_LIMIT)]
        hop_limit: usize,

        /// Slippage tolerance in percent
        #[arg(long, default_value = "0.5")]
        slippage: Decimal,

        /// Print the swap instruction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Amounts needed for a balanced deposit
    Deposit {
        /// LP token ticker of the pool
        #[arg(long)]
        pool: String,

        /// Ticker of the leading currency
        #[arg(long)]
        currency: String,

        /// Amount of the leading currency, in whole units
        #[arg(short, long)]
        amount: Decimal,
    },
    /// Amounts returned for a balanced withdrawal
    Withdraw {
        /// LP token ticker of the pool
        #[arg(long)]
        pool: String,

        /// LP tokens to burn, in whole units
        #[arg(short, long)]
        amount: Decimal,
    },
}

#[derive(Serialize)]
struct Quote {
    swap: SwapInstruction,
    output_amount: CurrencyAmount,
    execution_price: Decimal,
    price_impact: Decimal,
}

#[derive(Serialize)]
struct LiquidityQuote {
    instruction: LiquidityInstruction,
    lp_amount: CurrencyAmount,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pools = SnapshotFile::load(&cli.pools)?.into_pools()?;
    info!(count = pools.len(), path = %cli.pools.display(), "Loaded pool snapshot");

    match &cli.command {
        Commands::Pools => print_pools(&pools),
        Commands::Quote {
            from,
            to,
            amount,
            hop_limit,
            slippage,
            json,
        } => {
            let input = CurrencyAmount::from_decimal(find_currency(&pools, from)?, *amount)?;
            let output_currency = find_currency(&pools, to)?;
            let pairs = trading_pairs(&pools);

            let router = TradeRouter::new(RouterConfig::default().with_hop_limit(*hop_limit));
            let Some(trade) = router.find_best_trade(&input, &output_currency, &pairs)? else {
                println!("❌ No route from {from} to {to} within {hop_limit} hops.");
                return Ok(());
            };

            let quote = Quote {
                swap: trade.to_swap_instruction(*slippage)?,
                output_amount: trade.output_amount.clone(),
                execution_price: trade.execution_price.value,
                price_impact: trade.price_impact,
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
                return Ok(());
            }

            let route: Vec<_> = trade
                .path
                .iter()
                .map(|hop| format!("{} -[{}]-> {}", hop.input(), hop.lp_token(), hop.output()))
                .collect();
            println!("\n📊 Best Trade");
            println!("════════════════════════════════════");
            println!("Route:           {}", route.join(" | "));
            println!("Input:           {}", quote.swap.input_amount);
            println!("Output:          {}", quote.output_amount);
            println!("Minimum Output:  {} ({}% slippage)", quote.swap.minimum_output_amount, slippage);
            println!("Execution Price: {:.8}", quote.execution_price);
            println!("Price Impact:    {:.4}%", quote.price_impact);
            println!("════════════════════════════════════");
        }
        Commands::Deposit {
            pool,
            currency,
            amount,
        } => {
            let pool = find_pool(&pools, pool)?;
            let amount = CurrencyAmount::from_decimal(find_currency(&pools, currency)?, *amount)?;
            let quote = LiquidityQuote {
                instruction: LiquidityInstruction::deposit(pool, &amount)?,
                lp_amount: pool.deposit_lp_token_amount(&amount)?,
            };
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Commands::Withdraw { pool, amount } => {
            let pool = find_pool(&pools, pool)?;
            let lp_amount = CurrencyAmount::from_decimal(pool.lp_token().clone(), *amount)?;
            let quote = LiquidityQuote {
                instruction: LiquidityInstruction::withdrawal(pool, &lp_amount)?,
                lp_amount,
            };
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}

fn print_pools(pools: &[Pool]) {
    let mut table = Table::new();
    table.add_row(row!["Type", "LP Token", "Reserves", "Fee", "Supply", "Empty"]);
    for pool in pools {
        let reserves: Vec<_> = pool
            .pooled_currencies()
            .iter()
            .map(ToString::to_string)
            .collect();
        table.add_row(row![
            pool.pool_type(),
            pool.lp_token(),
            reserves.join("\n"),
            pool.trading_fee(),
            pool.total_supply(),
            pool.is_empty()
        ]);
    }
    table.printstd();
}

fn find_currency(pools: &[Pool], ticker: &str) -> Result<Currency> {
    let mut matches: Vec<Currency> = Vec::new();
    for pool in pools {
        let currencies = pool
            .snapshot()
            .pooled_currencies
            .iter()
            .map(|amount| &amount.currency)
            .chain(std::iter::once(pool.lp_token()));
        for currency in currencies.filter(|currency| currency.ticker == ticker) {
            if !matches.contains(currency) {
                matches.push(currency.clone());
            }
        }
    }
    match matches.len() {
        0 => Err(anyhow!("Currency {ticker} is not in any pool")),
        1 => Ok(matches.remove(0)),
        _ => bail!("Currency {ticker} is ambiguous across pools"),
    }
}

fn find_pool<'a>(pools: &'a [Pool], lp_ticker: &str) -> Result<&'a Pool> {
    let pool = pools
        .iter()
        .find(|pool| pool.lp_token().ticker == lp_ticker)
        .with_context(|| format!("No pool with LP token {lp_ticker}"))?;
    if pool.is_empty() {
        bail!("Pool {lp_ticker} is empty");
    }
    Ok(pool)
}
