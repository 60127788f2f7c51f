use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use floor_price_core::revenue::{
    margin, net_revenue, simple_margin, validate_amount, validate_proposal,
};
use floor_price_core::Money;

use crate::input;

/// Arguments for net revenue
#[derive(Args)]
pub struct RevenueArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Proposed monthly price before discount
    #[arg(long)]
    pub proposed_price: Option<Decimal>,

    /// Sales discount in percent
    #[arg(long)]
    pub discount_percent: Option<Decimal>,
}

#[derive(Deserialize)]
struct RevenueInput {
    proposed_price: Money,
    #[serde(default)]
    discount_percent: Decimal,
}

pub fn run_revenue(args: &RevenueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req: RevenueInput = match input::read_request(args.input.as_deref())? {
        Some(req) => req,
        None => RevenueInput {
            proposed_price: args
                .proposed_price
                .ok_or("--proposed-price is required (or provide --input)")?,
            discount_percent: args.discount_percent.unwrap_or(Decimal::ZERO),
        },
    };
    validate_proposal(req.proposed_price, req.discount_percent)?;
    let result = net_revenue(req.proposed_price, req.discount_percent);
    Ok(serde_json::to_value(result)?)
}

/// Arguments for margin over a floor
#[derive(Args)]
pub struct MarginArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Proposed monthly price before discount
    #[arg(long)]
    pub proposed_price: Option<Decimal>,

    /// Floor price to compare against
    #[arg(long)]
    pub floor_price: Option<Decimal>,

    /// Sales discount in percent
    #[arg(long)]
    pub discount_percent: Option<Decimal>,
}

#[derive(Deserialize)]
struct MarginInput {
    proposed_price: Money,
    floor_price: Money,
    #[serde(default)]
    discount_percent: Decimal,
}

pub fn run_margin(args: &MarginArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req: MarginInput = match input::read_request(args.input.as_deref())? {
        Some(req) => req,
        None => MarginInput {
            proposed_price: args
                .proposed_price
                .ok_or("--proposed-price is required (or provide --input)")?,
            floor_price: args
                .floor_price
                .ok_or("--floor-price is required (or provide --input)")?,
            discount_percent: args.discount_percent.unwrap_or(Decimal::ZERO),
        },
    };
    validate_proposal(req.proposed_price, req.discount_percent)?;
    validate_amount("floor_price", req.floor_price)?;
    let result = margin(req.proposed_price, req.floor_price, req.discount_percent);
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the legacy markup-over-floor margin
#[derive(Args)]
pub struct SimpleMarginArgs {
    /// Proposed monthly price
    #[arg(long)]
    pub proposed_price: Decimal,

    /// Floor price
    #[arg(long)]
    pub floor_price: Decimal,
}

pub fn run_simple_margin(args: &SimpleMarginArgs) -> Result<Value, Box<dyn std::error::Error>> {
    validate_amount("proposed_price", args.proposed_price)?;
    validate_amount("floor_price", args.floor_price)?;
    Ok(json!({
        "proposed_price": args.proposed_price,
        "floor_price": args.floor_price,
        "margin_percent": simple_margin(args.proposed_price, args.floor_price),
    }))
}
