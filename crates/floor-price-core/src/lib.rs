pub mod config;
pub mod error;
pub mod pricing;
pub mod revenue;
pub mod types;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "price_check")]
pub mod price_check;

pub use config::{resolve_snapshot, ConfigProvider, PricingConfig};
pub use error::FloorPriceError;
pub use types::*;

/// Standard result type for all floor-price operations
pub type FloorPriceResult<T> = Result<T, FloorPriceError>;
