use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    /// Two-asset constant product.
    Standard,
    /// N-asset stable swap over plain coins.
    StablePlain,
    /// Stable swap holding another stable pool's LP token as a coin.
    StableMeta,
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolType::Standard => "standard",
            PoolType::StablePlain => "stable",
            PoolType::StableMeta => "stable-meta",
        };
        f.write_str(name)
    }
}
