use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::snapshot::PricingConfig;
use crate::error::FloorPriceError;
use crate::FloorPriceResult;

/// How long a cached snapshot stays fresh unless told otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Source of the active pricing configuration.
///
/// `Ok(None)` means no configuration is active; callers go through
/// [`resolve_snapshot`] to get the compiled-in default in that case.
pub trait ConfigProvider {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>>;
}

/// Snapshot for one calculation: the active configuration, or the compiled-in
/// default when none is active. Provider errors are never papered over.
pub fn resolve_snapshot<P: ConfigProvider + ?Sized>(
    provider: &P,
) -> FloorPriceResult<Arc<PricingConfig>> {
    match provider.active_config()? {
        Some(config) => Ok(config),
        None => {
            debug!("no active pricing configuration, using compiled-in default");
            Ok(Arc::new(PricingConfig::default()))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for Arc<P> {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>> {
        (**self).active_config()
    }
}

// ---------------------------------------------------------------------------
// StaticProvider
// ---------------------------------------------------------------------------

/// A fixed snapshot, mainly for tests and one-shot CLI runs.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    config: Option<Arc<PricingConfig>>,
}

impl StaticProvider {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config: Some(Arc::new(config)),
        }
    }

    /// Provider with nothing active.
    pub fn empty() -> Self {
        Self { config: None }
    }
}

impl ConfigProvider for StaticProvider {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>> {
        Ok(self.config.clone())
    }
}

// ---------------------------------------------------------------------------
// FileProvider
// ---------------------------------------------------------------------------

/// Reads a JSON export on every call. A missing file means nothing is active.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigProvider for FileProvider {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "configuration file not found");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            FloorPriceError::Configuration(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        let config = PricingConfig::from_json_str(&contents)?;
        info!(config = %config.config_name, path = %self.path.display(), "loaded pricing configuration");
        Ok(Some(Arc::new(config)))
    }
}

// ---------------------------------------------------------------------------
// ConfigRegistry
// ---------------------------------------------------------------------------

/// Named configurations with at most one active at a time.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: BTreeMap<String, Arc<PricingConfig>>,
    active: Option<String>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration. It stays inactive until [`activate`](Self::activate).
    pub fn insert(&mut self, config: PricingConfig) -> FloorPriceResult<()> {
        config.validate()?;
        if self.configs.contains_key(&config.config_name) {
            return Err(FloorPriceError::InvalidInput {
                field: "config_name".into(),
                reason: format!("Configuration '{}' already exists", config.config_name),
            });
        }
        info!(config = %config.config_name, "registered pricing configuration");
        self.configs
            .insert(config.config_name.clone(), Arc::new(config));
        Ok(())
    }

    /// Make `name` the only active configuration.
    pub fn activate(&mut self, name: &str) -> FloorPriceResult<()> {
        if !self.configs.contains_key(name) {
            return Err(unknown_config(name));
        }
        if let Some(previous) = self.active.replace(name.to_string()) {
            if previous != name {
                info!(from = %previous, to = %name, "switched active pricing configuration");
            }
        } else {
            info!(config = %name, "activated pricing configuration");
        }
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if let Some(previous) = self.active.take() {
            info!(config = %previous, "deactivated pricing configuration");
        }
    }

    /// Remove an inactive configuration.
    pub fn remove(&mut self, name: &str) -> FloorPriceResult<Arc<PricingConfig>> {
        if self.active.as_deref() == Some(name) {
            return Err(FloorPriceError::InvalidInput {
                field: "config_name".into(),
                reason: format!("Cannot delete the active configuration '{name}'"),
            });
        }
        self.configs.remove(name).ok_or_else(|| unknown_config(name))
    }

    /// Copy `original` under `new_name`, inactive.
    pub fn duplicate(
        &mut self,
        original: &str,
        new_name: &str,
        created_by: Option<&str>,
    ) -> FloorPriceResult<()> {
        let source = self
            .configs
            .get(original)
            .ok_or_else(|| unknown_config(original))?;
        let copy = source.duplicate(new_name, created_by);
        self.insert(copy)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PricingConfig>> {
        self.configs.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

fn unknown_config(name: &str) -> FloorPriceError {
    FloorPriceError::InvalidInput {
        field: "config_name".into(),
        reason: format!("Unknown configuration '{name}'"),
    }
}

impl ConfigProvider for ConfigRegistry {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>> {
        Ok(self
            .active
            .as_ref()
            .and_then(|name| self.configs.get(name))
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// CachedProvider
// ---------------------------------------------------------------------------

struct CacheEntry {
    fetched_at: Instant,
    config: Arc<PricingConfig>,
}

/// TTL cache in front of another provider.
///
/// Two calculations may see different snapshots if the cache refreshed in
/// between; each single calculation still sees one immutable snapshot.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl<P: ConfigProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Drop the cached snapshot; the next call goes to the inner provider.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Mutable access to the inner provider. Invalidates the cache.
    pub fn inner_mut(&mut self) -> &mut P {
        *self.cache.get_mut().unwrap_or_else(|e| e.into_inner()) = None;
        &mut self.inner
    }
}

impl<P: ConfigProvider> ConfigProvider for CachedProvider<P> {
    fn active_config(&self) -> FloorPriceResult<Option<Arc<PricingConfig>>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = cache.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(Some(Arc::clone(&entry.config)));
            }
        }
        let config = self.inner.active_config()?;
        // Only a found snapshot is cached; "nothing active" is asked again next call.
        *cache = config.as_ref().map(|c| {
            debug!(config = %c.config_name, "refreshed cached pricing configuration");
            CacheEntry {
                fetched_at: Instant::now(),
                config: Arc::clone(c),
            }
        });
        Ok(config)
    }
}
