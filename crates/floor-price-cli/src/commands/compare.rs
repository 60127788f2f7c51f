use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use floor_price_core::comparison::{generate_comparison, ComparisonParams};
use floor_price_core::{CustomerSegment, Mbps, Money, PricingConfig};

use super::floor::{check_ratio, DEFAULT_EXISTING_RATIO};
use crate::input;

/// Parse `SPEED=PRICE`, e.g. `500=599`.
fn parse_proposed(s: &str) -> Result<(Mbps, Money), String> {
    let (speed, price) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SPEED=PRICE, got '{s}'"))?;
    let speed: Mbps = speed
        .trim()
        .parse()
        .map_err(|e| format!("invalid speed '{speed}': {e}"))?;
    let price: Money = price
        .trim()
        .parse()
        .map_err(|e| format!("invalid price '{price}': {e}"))?;
    Ok((speed, price))
}

/// Arguments for the catalog comparison table
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Customer segment (residential or business)
    #[arg(long)]
    pub segment: Option<CustomerSegment>,

    /// Installation distance in kilometers
    #[arg(long)]
    pub distance_km: Option<Decimal>,

    /// Equipment label (repeat for several)
    #[arg(long = "equipment")]
    pub equipment: Vec<String>,

    /// Contract length in months
    #[arg(long)]
    pub contract_months: Option<u32>,

    /// Include a fixed IP address
    #[arg(long)]
    pub fixed_ip: bool,

    /// Share of existing customers, 0-1 (default 0.7)
    #[arg(long)]
    pub existing_ratio: Option<Decimal>,

    /// Sales discount in percent applied to proposed prices
    #[arg(long)]
    pub discount_percent: Option<Decimal>,

    /// Proposed price for a catalog speed, SPEED=PRICE (repeat for several)
    #[arg(long = "proposed", value_parser = parse_proposed)]
    pub proposed: Vec<(Mbps, Money)>,
}

pub fn run_compare(
    args: &CompareArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let params: ComparisonParams = match input::read_request(args.input.as_deref())? {
        Some(params) => params,
        None => ComparisonParams {
            segment: args.segment.unwrap_or_default(),
            distance_km: args.distance_km.unwrap_or(Decimal::ZERO),
            equipment: args.equipment.clone(),
            contract_months: args
                .contract_months
                .ok_or("--contract-months is required (or provide --input)")?,
            has_fixed_ip: args.fixed_ip,
            existing_ratio: args.existing_ratio.unwrap_or(DEFAULT_EXISTING_RATIO),
            discount_percent: args.discount_percent.unwrap_or(Decimal::ZERO),
            proposed_prices: args.proposed.iter().copied().collect::<BTreeMap<_, _>>(),
        },
    };
    check_ratio(params.existing_ratio)?;

    let result = generate_comparison(config, &params)?;
    Ok(serde_json::to_value(result)?)
}
