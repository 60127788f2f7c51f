use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::Value;

use floor_price_core::pricing::{
    compute_floor, compute_installation, compute_weighted_floor, validate_distance, FloorRequest,
};
use floor_price_core::{CustomerSegment, PricingConfig, Rate};

use crate::input;

/// Existing-customer share assumed when none is given.
pub const DEFAULT_EXISTING_RATIO: Rate = dec!(0.7);

/// Package flags shared by every command that prices a package
#[derive(Args)]
pub struct PackageFlags {
    /// Customer segment (residential or business)
    #[arg(long)]
    pub segment: Option<CustomerSegment>,

    /// Requested speed in Mbps
    #[arg(long)]
    pub speed: Option<Decimal>,

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
}

impl PackageFlags {
    pub fn to_request(&self) -> Result<FloorRequest, Box<dyn std::error::Error>> {
        let speed = self
            .speed
            .ok_or("--speed is required (or provide --input)")?;
        let contract_months = self
            .contract_months
            .ok_or("--contract-months is required (or provide --input)")?;

        Ok(FloorRequest {
            segment: self.segment.unwrap_or_default(),
            speed,
            distance_km: self.distance_km.unwrap_or(Decimal::ZERO),
            equipment: self.equipment.clone(),
            contract_months,
            has_fixed_ip: self.fixed_ip,
        })
    }
}

pub fn check_ratio(ratio: Rate) -> Result<Rate, Box<dyn std::error::Error>> {
    if ratio < Decimal::ZERO || ratio > Decimal::ONE {
        return Err(format!("existing ratio must be between 0 and 1, got {ratio}").into());
    }
    Ok(ratio)
}

/// Arguments for the existing-customer floor
#[derive(Args)]
pub struct FloorArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub package: PackageFlags,
}

pub fn run_floor(
    args: &FloorArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: FloorRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => args.package.to_request()?,
    };
    let result = compute_floor(config, &request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for installation cost
#[derive(Args)]
pub struct InstallationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Customer segment (residential or business)
    #[arg(long)]
    pub segment: Option<CustomerSegment>,

    /// Installation distance in kilometers
    #[arg(long)]
    pub distance_km: Option<Decimal>,
}

#[derive(Deserialize)]
struct InstallationInput {
    segment: CustomerSegment,
    #[serde(default)]
    distance_km: Decimal,
}

pub fn run_installation(
    args: &InstallationArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let req: InstallationInput = match input::read_request(args.input.as_deref())? {
        Some(req) => req,
        None => InstallationInput {
            segment: args.segment.unwrap_or_default(),
            distance_km: args
                .distance_km
                .ok_or("--distance-km is required (or provide --input)")?,
        },
    };
    validate_distance(req.distance_km)?;
    let result = compute_installation(config, req.segment, req.distance_km);
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the weighted floor
#[derive(Args)]
pub struct WeightedArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub package: PackageFlags,

    /// Share of existing customers, 0-1 (default 0.7)
    #[arg(long)]
    pub existing_ratio: Option<Decimal>,
}

#[derive(Deserialize)]
struct WeightedInput {
    #[serde(flatten)]
    request: FloorRequest,
    existing_ratio: Option<Rate>,
}

pub fn run_weighted(
    args: &WeightedArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (request, ratio) = match input::read_request::<WeightedInput>(args.input.as_deref())? {
        Some(w) => (w.request, w.existing_ratio),
        None => (args.package.to_request()?, args.existing_ratio),
    };
    let ratio = check_ratio(ratio.unwrap_or(DEFAULT_EXISTING_RATIO))?;
    let result = compute_weighted_floor(config, &request, ratio)?;
    Ok(serde_json::to_value(result)?)
}
