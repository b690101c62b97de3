pub mod meta;
pub mod stable;
pub mod standard;

pub use meta::StableMetaPool;
pub use stable::StablePool;
pub use standard::StandardPool;
