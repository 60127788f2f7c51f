//! Pricing configuration snapshots and the providers that supply them.

pub mod provider;
pub mod snapshot;

pub use provider::{
    resolve_snapshot, CachedProvider, ConfigProvider, ConfigRegistry, FileProvider,
    StaticProvider, DEFAULT_CACHE_TTL,
};
pub use snapshot::{InstallationBase, InstallationPricing, PricingConfig, DEFAULT_CONFIG_NAME};
