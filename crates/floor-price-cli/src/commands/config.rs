use clap::Args;
use serde_json::{json, Value};

use floor_price_core::{CustomerSegment, PricingConfig};

use crate::input;

pub fn run_show_config(config: &PricingConfig) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(config)?)
}

/// Arguments for configuration validation
#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to check (JSON or YAML)
    pub path: String,
}

pub fn run_validate_config(args: &ValidateConfigArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = input::config::read_config_file(&args.path)?;

    let speeds: serde_json::Map<String, Value> = CustomerSegment::ALL
        .iter()
        .map(|segment| {
            let table = config.speed_table(*segment);
            (
                segment.to_string(),
                json!({
                    "speeds": table.len(),
                    "min_mbps": table.keys().next(),
                    "max_mbps": table.keys().next_back(),
                }),
            )
        })
        .collect();

    Ok(json!({
        "valid": true,
        "config_name": config.config_name,
        "speed_tiers": speeds,
        "equipment_items": config.equipment_prices.len(),
    }))
}
