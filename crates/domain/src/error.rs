//! Error taxonomy shared by every pricing and routing operation.
//!
//! All errors are synchronous and non-retryable: they describe a problem with
//! the supplied snapshot or arguments, never a transient condition.

use thiserror::Error;

/// Iteration cap for every Newton solve in the stable-swap math.
pub const MAX_ITERATIONS: usize = 255;

/// Errors raised by pool math, liquidity calculations and trade comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// The requested currency is not one of the pool's reserves.
    #[error("currency {0} is not pooled here")]
    CurrencyNotInPool(String),

    /// An amount list does not cover the pool's coins one-to-one.
    #[error("expected {expected} amounts, got {actual}")]
    PoolSizeMismatch {
        /// Number of coins in the pool.
        expected: usize,
        /// Number of amounts supplied.
        actual: usize,
    },

    /// The same currency was supplied twice where one entry per coin is required.
    #[error("currency {0} appears more than once")]
    DuplicateCurrency(String),

    /// A Newton iteration did not settle within [`MAX_ITERATIONS`] rounds.
    #[error("{0} did not converge within {max} iterations", max = MAX_ITERATIONS)]
    Convergence(&'static str),

    /// A coin index is outside the pool or the in/out indices coincide.
    #[error("token index {index} is invalid for a pool of {size} coins")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of coins in the pool.
        size: usize,
    },

    /// Trades with different input amounts or output currencies were compared.
    #[error("trades are not comparable: {0}")]
    IncomparableTrades(&'static str),

    /// An intermediate value left the representable range.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// A division by zero, usually an empty pool that was not checked first.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    /// A withdrawal or burn asks for more than the pool holds.
    #[error("insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    /// A pool or trade parameter is outside its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An amount is denominated in a different currency than expected.
    #[error("expected currency {expected}, got {actual}")]
    UnexpectedCurrency {
        /// Ticker the operation needs.
        expected: String,
        /// Ticker that was supplied.
        actual: String,
    },

    /// A path element cannot be evaluated by this engine.
    #[error("unsupported hop: {0}")]
    UnsupportedHop(&'static str),
}
