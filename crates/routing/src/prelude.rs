//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use amm_router_routing::prelude::*;
//! ```

// Pairs
pub use crate::pair::{TradingPair, trading_pairs};

// Paths
pub use crate::path::{PathElement, PathStep, path_output};

// Router
pub use crate::router::{DEFAULT_HOP_LIMIT, RouterConfig, TradeRouter, find_best_trade};

// Trades
pub use crate::trade::{DEFAULT_SAMPLE_DIVISOR, LiquidityInstruction, SwapInstruction, Trade};
