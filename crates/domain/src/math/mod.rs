/// Two-asset constant-product formulas.
pub mod constant_product;
/// Wide integer helpers and decimal conversions.
pub mod fixed_point;
/// Stable-swap invariant solvers.
pub mod stable_swap;
