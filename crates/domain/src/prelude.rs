//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use amm_router_domain::prelude::*;
//! ```

// Errors
pub use crate::error::{AmmError, MAX_ITERATIONS};

// Currencies and amounts
pub use crate::token::{Currency, CurrencyKind};
pub use crate::value_objects::{CurrencyAmount, Price};

// Pools
pub use crate::enums::PoolType;
pub use crate::pool::{Pool, PoolSnapshot};
pub use crate::pools::{StableMetaPool, StablePool, StandardPool};
