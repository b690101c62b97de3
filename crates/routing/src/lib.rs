//! Trade routing over AMM pools.
//!
//! This crate provides:
//! - Path elements describing one hop through a pool
//! - Trades with execution price, price impact and slippage bounds
//! - The trading pair capability and the pools that implement it
//! - A bounded recursive search for the best route between two currencies
//! - Instruction records handed to a transaction encoder

/// Prelude module for convenient imports.
pub mod prelude;

/// Trading pair capability.
pub mod pair;
/// Route hops.
pub mod path;
/// Best-path search.
pub mod router;
/// Trade results and encoder instructions.
pub mod trade;
