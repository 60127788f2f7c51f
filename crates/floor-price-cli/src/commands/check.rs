use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use floor_price_core::price_check::{quick_check, run_price_check, PriceCheckRequest};
use floor_price_core::pricing::FloorRequest;
use floor_price_core::{Money, PricingConfig};

use super::floor::{PackageFlags, DEFAULT_EXISTING_RATIO};
use crate::input;

/// Arguments for a full price check
#[derive(Args)]
pub struct CheckArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub package: PackageFlags,

    /// Proposed monthly price before discount
    #[arg(long)]
    pub proposed_price: Option<Decimal>,

    /// Sales discount in percent
    #[arg(long)]
    pub discount_percent: Option<Decimal>,

    /// Share of existing customers, 0-1 (default 0.7)
    #[arg(long)]
    pub existing_ratio: Option<Decimal>,

    /// Free-text note kept with the record
    #[arg(long)]
    pub notes: Option<String>,
}

pub fn run_check(
    args: &CheckArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PriceCheckRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let package = args.package.to_request()?;
            PriceCheckRequest {
                segment: package.segment,
                speed: package.speed,
                distance_km: package.distance_km,
                equipment: package.equipment,
                contract_months: package.contract_months,
                has_fixed_ip: package.has_fixed_ip,
                proposed_price: args
                    .proposed_price
                    .ok_or("--proposed-price is required (or provide --input)")?,
                discount_percent: args.discount_percent.unwrap_or(Decimal::ZERO),
                existing_ratio: args.existing_ratio.unwrap_or(DEFAULT_EXISTING_RATIO),
                notes: args.notes.clone(),
            }
        }
    };

    let result = run_price_check(config, &request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the single-floor check
#[derive(Args)]
pub struct QuickCheckArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub package: PackageFlags,

    /// Proposed monthly price
    #[arg(long)]
    pub proposed_price: Option<Decimal>,
}

#[derive(Deserialize)]
struct QuickCheckInput {
    #[serde(flatten)]
    request: FloorRequest,
    proposed_price: Money,
}

pub fn run_quick_check(
    args: &QuickCheckArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let req = match input::read_request::<QuickCheckInput>(args.input.as_deref())? {
        Some(req) => req,
        None => QuickCheckInput {
            request: args.package.to_request()?,
            proposed_price: args
                .proposed_price
                .ok_or("--proposed-price is required (or provide --input)")?,
        },
    };

    let result = quick_check(config, &req.request, req.proposed_price)?;
    Ok(serde_json::to_value(result)?)
}
