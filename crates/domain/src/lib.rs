//! Core AMM pricing model.
//!
//! This crate provides the pure computation layer of the router:
//! - Currencies and exact atomic amounts
//! - Constant-product and stable-swap math
//! - Proportional liquidity calculations shared by every pool type
//! - Standard, stable and stable meta pool snapshots
//!
//! Nothing in this crate performs I/O. Pools are immutable snapshots supplied
//! by the caller and every call recomputes from them.

/// Prelude module for convenient imports.
pub mod prelude;

/// Pool type tags.
pub mod enums;
/// Error taxonomy.
pub mod error;
/// Balanced liquidity calculator.
pub mod liquidity;
/// Integer math for the pool curves.
pub mod math;
/// Pool snapshots and the pool sum type.
pub mod pool;
/// Pool variants.
pub mod pools;
/// Currency descriptors.
pub mod token;
/// Amounts and prices.
pub mod value_objects;
