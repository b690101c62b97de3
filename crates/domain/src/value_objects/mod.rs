pub mod amount;
pub mod price;

pub use amount::CurrencyAmount;
pub use price::Price;
