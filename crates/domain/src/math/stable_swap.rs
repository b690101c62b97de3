//! Stable-swap invariant solvers.
//!
//! Balances (`xp`) are expected at [`PRECISION_DECIMALS`] so that coins with
//! different decimals are comparable. The invariant, with `n` coins,
//! `S = Σ xp` and `Ann = A · n`, is
//!
//! ```text
//! Ann · S + D = Ann · D + D_P,   D_P = D^(n+1) / (n^n · Π xp)
//! ```
//!
//! and every solve is a bounded Newton iteration that stops once two
//! consecutive estimates are within one precision unit.
//!
//! [`PRECISION_DECIMALS`]: crate::math::fixed_point::PRECISION_DECIMALS

use crate::error::{AmmError, MAX_ITERATIONS};
use crate::math::fixed_point::distance;
use primitive_types::{U256, U512};
use tracing::debug;

fn converged(current: U256, previous: U256) -> bool {
    distance(current, previous) <= U256::one()
}

fn checked_add(a: U256, b: U256, context: &'static str) -> Result<U256, AmmError> {
    a.checked_add(b).ok_or(AmmError::Overflow(context))
}

fn checked_mul(a: U256, b: U256, context: &'static str) -> Result<U256, AmmError> {
    a.checked_mul(b).ok_or(AmmError::Overflow(context))
}

fn amplified(amp: U256, n_coins: usize) -> Result<U256, AmmError> {
    if amp.is_zero() {
        return Err(AmmError::InvalidParameter(
            "amplification coefficient must be positive".to_string(),
        ));
    }
    checked_mul(amp, U256::from(n_coins), "ann")
}

/// `floor(a * b / c)` over 512 bits, or `None` when the result does not fit.
fn wide_mul_div(a: U512, b: U512, c: U512) -> Option<U512> {
    if let Some(product) = a.checked_mul(b) {
        return Some(product / c);
    }
    let whole = (a / c).checked_mul(b)?;
    let part = (a % c).checked_mul(b)? / c;
    whole.checked_add(part)
}

/// `d^(k+1) / (n^k · Π balances)` over the `k` given balances, sorted
/// ascending, or `None` once the value no longer fits in 512 bits.
///
/// The running product grows through the smallest remaining balance while it
/// fits in 256 bits and shrinks through the largest one otherwise. A `None`
/// only comes from a shrink step with a factor of at least one, so the full
/// product is at least 2^512 in that case.
fn product_term(
    sorted: &[U256],
    d: U256,
    n_coins: usize,
    context: &'static str,
) -> Result<Option<U512>, AmmError> {
    let n = U512::from(n_coins);
    let pivot = U512::from(U256::MAX);
    let d = U512::from(d);

    let mut product = d;
    let (mut low, mut high) = (0, sorted.len());
    while low < high {
        let x = if product <= pivot {
            low += 1;
            sorted[low - 1]
        } else {
            high -= 1;
            sorted[high]
        };
        let denominator = U512::from(x) * n;
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero(context));
        }
        match wide_mul_div(product, d, denominator) {
            Some(next) => product = next,
            None => return Ok(None),
        }
    }
    Ok(Some(product))
}

fn sorted_balances(balances: impl Iterator<Item = U256>) -> Vec<U256> {
    let mut sorted: Vec<U256> = balances.collect();
    sorted.sort_unstable();
    sorted
}

/// Solves the invariant `D` for the given normalised balances.
///
/// Newton steps run from `D = S` downwards. While `D_P` is at least
/// `2^(n+1) · Ann · S` the estimate is at least twice the root, so it is
/// halved instead.
pub fn get_d(xp: &[U256], amp: U256) -> Result<U256, AmmError> {
    let n_coins = xp.len();
    let sum = xp
        .iter()
        .try_fold(U256::zero(), |acc, x| checked_add(acc, *x, "get_d"))?;
    if sum.is_zero() {
        return Ok(U256::zero());
    }
    let ann = U512::from(amplified(amp, n_coins)?);
    let n = U512::from(n_coins);
    let ann_sum = ann * U512::from(sum);
    let ceiling = U512::from(2u8)
        .checked_pow(n + U512::one())
        .and_then(|scale| scale.checked_mul(ann_sum))
        .ok_or(AmmError::Overflow("get_d"))?;
    let sorted = sorted_balances(xp.iter().copied());

    let mut d = sum;
    for _ in 0..MAX_ITERATIONS {
        let d_p = match product_term(&sorted, d, n_coins, "get_d")? {
            Some(d_p) if d_p < ceiling => d_p,
            _ => {
                d = d / U256::from(2u8);
                continue;
            }
        };
        let previous = d;
        let d_wide = U512::from(d);

        let numerator = n
            .checked_mul(d_p)
            .and_then(|term| term.checked_add(ann_sum))
            .and_then(|term| term.checked_mul(d_wide))
            .ok_or(AmmError::Overflow("get_d"))?;
        let denominator = (n + U512::one())
            .checked_mul(d_p)
            .and_then(|term| term.checked_add((ann - U512::one()) * d_wide))
            .ok_or(AmmError::Overflow("get_d"))?;
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero("get_d"));
        }
        d = U256::try_from(numerator / denominator).map_err(|_| AmmError::Overflow("get_d"))?;

        if converged(d, previous) {
            return Ok(d);
        }
    }

    debug!(coins = n_coins, amp = %amp, "D solver hit the iteration cap");
    Err(AmmError::Convergence("D"))
}

/// Newton iteration `y = (y² + c) / (2y + b − D)` shared by both Y solvers.
fn solve_y(b: U256, c: U512, d: U256, context: &'static str) -> Result<U256, AmmError> {
    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let previous = y;

        let numerator = y
            .full_mul(y)
            .checked_add(c)
            .ok_or(AmmError::Overflow(context))?;
        let denominator = checked_add(checked_mul(y, U256::from(2u8), context)?, b, context)?
            .checked_sub(d)
            .ok_or(AmmError::Overflow(context))?;
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero(context));
        }
        y = U256::try_from(numerator / U512::from(denominator))
            .map_err(|_| AmmError::Overflow(context))?;

        if converged(y, previous) {
            return Ok(y);
        }
    }

    debug!(d = %d, "{context} solver hit the iteration cap");
    Err(AmmError::Convergence(context))
}

/// Accumulates `S'` and `c` over every coin except `skip`, then solves for it.
fn solve_for_index(
    amp: U256,
    skip: usize,
    balances: impl Iterator<Item = U256>,
    n_coins: usize,
    d: U256,
    context: &'static str,
) -> Result<U256, AmmError> {
    let ann = amplified(amp, n_coins)?;
    let others = sorted_balances(
        balances
            .enumerate()
            .filter(|(k, _)| *k != skip)
            .map(|(_, x)| x),
    );
    let s = others
        .iter()
        .try_fold(U256::zero(), |acc, x| checked_add(acc, *x, context))?;

    let c = product_term(&others, d, n_coins, context)?
        .and_then(|c| wide_mul_div(c, U512::from(d), ann.full_mul(U256::from(n_coins))))
        .ok_or(AmmError::Overflow(context))?;
    let b = checked_add(s, d / ann, context)?;

    solve_y(b, c, d, context)
}

fn check_index(index: usize, n_coins: usize) -> Result<(), AmmError> {
    if index >= n_coins {
        return Err(AmmError::IndexOutOfRange {
            index,
            size: n_coins,
        });
    }
    Ok(())
}

/// New balance of `out_index` once `in_index` holds `in_balance`, keeping `D` fixed.
pub fn get_y(
    in_index: usize,
    out_index: usize,
    in_balance: U256,
    xp: &[U256],
    amp: U256,
) -> Result<U256, AmmError> {
    let n_coins = xp.len();
    check_index(in_index, n_coins)?;
    check_index(out_index, n_coins)?;
    if in_index == out_index {
        return Err(AmmError::IndexOutOfRange {
            index: out_index,
            size: n_coins,
        });
    }

    let d = get_d(xp, amp)?;
    let balances = xp
        .iter()
        .enumerate()
        .map(|(k, x)| if k == in_index { in_balance } else { *x });

    solve_for_index(amp, out_index, balances, n_coins, d, "y")
}

/// Balance of `index` that makes the pool satisfy the target invariant `d`.
pub fn get_y_d(amp: U256, index: usize, xp: &[U256], d: U256) -> Result<U256, AmmError> {
    let n_coins = xp.len();
    check_index(index, n_coins)?;
    solve_for_index(amp, index, xp.iter().copied(), n_coins, d, "y_d")
}
