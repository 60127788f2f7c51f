use std::path::Path;
use std::sync::Arc;
use tracing::info;

use floor_price_core::config::{resolve_snapshot, FileProvider, StaticProvider};
use floor_price_core::PricingConfig;

use super::file;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse and validate a configuration file, JSON or YAML by extension.
pub fn read_config_file(path: &str) -> Result<PricingConfig, Box<dyn std::error::Error>> {
    let (canonical, contents) = file::read_text(path)?;
    let config = if is_yaml(&canonical) {
        let config: PricingConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
        config.validate()?;
        config
    } else {
        PricingConfig::from_json_str(&contents)?
    };
    Ok(config)
}

/// Snapshot for this run: the `--config` file if given, otherwise the compiled-in default.
pub fn load_config(path: Option<&str>) -> Result<Arc<PricingConfig>, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let canonical = file::resolve_path(path)?;
            if is_yaml(&canonical) {
                Arc::new(read_config_file(path)?)
            } else {
                resolve_snapshot(&FileProvider::new(canonical))?
            }
        }
        None => resolve_snapshot(&StaticProvider::empty())?,
    };
    info!(config = %config.config_name, "using pricing configuration");
    Ok(config)
}
