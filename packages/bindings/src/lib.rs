use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use floor_price_core::pricing::FloorRequest;
use floor_price_core::revenue::{validate_amount, validate_proposal};
use floor_price_core::{CustomerSegment, Money, PricingConfig, Rate};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `{ "config": <optional PricingConfig>, "request": {...} }`
#[derive(Deserialize)]
struct Call<T> {
    #[serde(default)]
    config: Option<PricingConfig>,
    request: T,
}

/// Parse a call, validating a supplied config or falling back to the default.
fn parse_call<T: DeserializeOwned>(input_json: &str) -> NapiResult<(PricingConfig, T)> {
    let call: Call<T> = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let config = match call.config {
        Some(config) => {
            config.validate().map_err(to_napi_error)?;
            config
        }
        None => PricingConfig::default(),
    };
    Ok((config, call.request))
}

fn to_json<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Floor pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn floor_price(input_json: String) -> NapiResult<String> {
    let (config, request): (_, FloorRequest) = parse_call(&input_json)?;
    let output =
        floor_price_core::pricing::compute_floor(&config, &request).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct InstallationRequest {
    segment: CustomerSegment,
    #[serde(default)]
    distance_km: Decimal,
}

#[napi]
pub fn installation_cost(input_json: String) -> NapiResult<String> {
    let (config, request): (_, InstallationRequest) = parse_call(&input_json)?;
    floor_price_core::pricing::validate_distance(request.distance_km).map_err(to_napi_error)?;
    let output = floor_price_core::pricing::compute_installation(
        &config,
        request.segment,
        request.distance_km,
    );
    to_json(&output)
}

#[derive(Deserialize)]
struct WeightedRequest {
    #[serde(flatten)]
    package: FloorRequest,
    existing_ratio: Rate,
}

#[napi]
pub fn weighted_floor(input_json: String) -> NapiResult<String> {
    let (config, request): (_, WeightedRequest) = parse_call(&input_json)?;
    let output = floor_price_core::pricing::compute_weighted_floor(
        &config,
        &request.package,
        request.existing_ratio,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Revenue and margins
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RevenueRequest {
    proposed_price: Money,
    #[serde(default)]
    discount_percent: Decimal,
    floor_price: Option<Money>,
}

impl RevenueRequest {
    /// Same ranges the CLI and price check enforce.
    fn validate(&self) -> NapiResult<()> {
        validate_proposal(self.proposed_price, self.discount_percent).map_err(to_napi_error)
    }

    fn checked_floor(&self) -> NapiResult<Money> {
        let floor = self
            .floor_price
            .ok_or_else(|| to_napi_error("floor_price is required"))?;
        validate_amount("floor_price", floor).map_err(to_napi_error)?;
        Ok(floor)
    }
}

#[napi]
pub fn net_revenue(input_json: String) -> NapiResult<String> {
    let (_, request): (PricingConfig, RevenueRequest) = parse_call(&input_json)?;
    request.validate()?;
    let output =
        floor_price_core::revenue::net_revenue(request.proposed_price, request.discount_percent);
    to_json(&output)
}

#[napi]
pub fn margin(input_json: String) -> NapiResult<String> {
    let (_, request): (PricingConfig, RevenueRequest) = parse_call(&input_json)?;
    request.validate()?;
    let floor = request.checked_floor()?;
    let output =
        floor_price_core::revenue::margin(request.proposed_price, floor, request.discount_percent);
    to_json(&output)
}

#[napi]
pub fn simple_margin(input_json: String) -> NapiResult<String> {
    let (_, request): (PricingConfig, RevenueRequest) = parse_call(&input_json)?;
    validate_amount("proposed_price", request.proposed_price).map_err(to_napi_error)?;
    let floor = request.checked_floor()?;
    let margin_percent = floor_price_core::revenue::simple_margin(request.proposed_price, floor);
    to_json(&serde_json::json!({ "margin_percent": margin_percent }))
}

// ---------------------------------------------------------------------------
// Comparison and price checks
// ---------------------------------------------------------------------------

#[napi]
pub fn comparison_table(input_json: String) -> NapiResult<String> {
    let (config, params): (_, floor_price_core::comparison::ComparisonParams) =
        parse_call(&input_json)?;
    let output = floor_price_core::comparison::generate_comparison(&config, &params)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn price_check(input_json: String) -> NapiResult<String> {
    let (config, request): (_, floor_price_core::price_check::PriceCheckRequest) =
        parse_call(&input_json)?;
    let output = floor_price_core::price_check::run_price_check(&config, &request)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct QuickCheckRequest {
    #[serde(flatten)]
    package: FloorRequest,
    proposed_price: Money,
}

#[napi]
pub fn quick_check(input_json: String) -> NapiResult<String> {
    let (config, request): (_, QuickCheckRequest) = parse_call(&input_json)?;
    let output =
        floor_price_core::price_check::quick_check(&config, &request.package, request.proposed_price)
            .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[napi]
pub fn default_config() -> NapiResult<String> {
    PricingConfig::default().to_json_pretty().map_err(to_napi_error)
}

/// Parse and validate an exported configuration; returns it normalised.
#[napi]
pub fn validate_config(config_json: String) -> NapiResult<String> {
    let config = PricingConfig::from_json_str(&config_json).map_err(to_napi_error)?;
    to_json(&config)
}
