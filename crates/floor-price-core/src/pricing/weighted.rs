use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::floor::{compute_floor, FloorPriceBreakdown, FloorRequest};
use crate::config::PricingConfig;
use crate::error::FloorPriceError;
use crate::types::{round_money, Money, Rate};
use crate::FloorPriceResult;

/// Existing-customer, new-customer and blended floors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFloorResult {
    /// Floor for a customer already connected (no installation)
    pub floor_existing: Money,
    /// Floor plus installation amortised over the contract
    pub floor_new: Money,
    /// floor_existing * ratio + floor_new * (1 - ratio)
    pub floor_weighted: Money,
    /// Share of existing customers in the expected mix
    pub existing_ratio: Rate,
    pub breakdown_existing: FloorPriceBreakdown,
    pub breakdown_new: FloorPriceBreakdown,
}

/// Installation total spread evenly over the contract.
pub fn amortize_installation(total_cost: Money, contract_months: u32) -> FloorPriceResult<Money> {
    if contract_months == 0 {
        return Err(FloorPriceError::InvalidInput {
            field: "contract_months".into(),
            reason: "Contract length must be positive to amortise installation".into(),
        });
    }
    Ok(total_cost / Decimal::from(contract_months))
}

/// Blend the existing-customer and new-customer floors.
///
/// `existing_ratio` outside [0, 1] and a zero `contract_months` are both
/// rejected as `InvalidInput`.
pub fn compute_weighted_floor(
    config: &PricingConfig,
    request: &FloorRequest,
    existing_ratio: Rate,
) -> FloorPriceResult<WeightedFloorResult> {
    if existing_ratio < Decimal::ZERO || existing_ratio > Decimal::ONE {
        return Err(FloorPriceError::InvalidInput {
            field: "existing_ratio".into(),
            reason: "Existing customer ratio must be between 0 and 1".into(),
        });
    }
    let breakdown_existing = compute_floor(config, request)?;
    let floor_existing = breakdown_existing.floor_price;

    let amortized = amortize_installation(
        breakdown_existing.installation.total_cost,
        request.contract_months,
    )?;
    let floor_new = round_money(floor_existing + amortized);

    let mut breakdown_new = breakdown_existing.clone();
    breakdown_new.installation_included = true;
    breakdown_new.amortized_installation = round_money(amortized);
    breakdown_new.floor_price = floor_new;

    let floor_weighted = round_money(
        floor_existing * existing_ratio + floor_new * (Decimal::ONE - existing_ratio),
    );

    debug!(
        %floor_existing,
        %floor_new,
        %floor_weighted,
        %existing_ratio,
        "computed weighted floor"
    );

    Ok(WeightedFloorResult {
        floor_existing,
        floor_new,
        floor_weighted,
        existing_ratio,
        breakdown_existing,
        breakdown_new,
    })
}
