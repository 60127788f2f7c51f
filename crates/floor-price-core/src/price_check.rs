use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::error::invalid_input;
use crate::pricing::{
    compute_floor, compute_weighted_floor, installation_fee, FloorPriceBreakdown, FloorRequest,
    WeightedFloorResult,
};
use crate::revenue::{margin_against, net_revenue, simple_margin, validate_amount, validate_proposal};
use crate::types::{with_metadata, ComputationOutput, CustomerSegment, Money, Rate};
use crate::FloorPriceResult;

fn default_existing_ratio() -> Rate {
    dec!(0.7)
}

/// A sales price check as submitted by the form or CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCheckRequest {
    pub segment: CustomerSegment,
    pub speed: Decimal,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub contract_months: u32,
    #[serde(default)]
    pub has_fixed_ip: bool,
    /// Proposed monthly price before discount
    pub proposed_price: Money,
    /// Sales discount, 0-100
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Expected share of existing customers, 0-1
    #[serde(default = "default_existing_ratio")]
    pub existing_ratio: Rate,
    /// Free text kept for the audit log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PriceCheckRequest {
    pub fn floor_request(&self) -> FloorRequest {
        FloorRequest {
            segment: self.segment,
            speed: self.speed,
            distance_km: self.distance_km,
            equipment: self.equipment.clone(),
            contract_months: self.contract_months,
            has_fixed_ip: self.has_fixed_ip,
        }
    }

    pub fn validate(&self) -> FloorPriceResult<()> {
        if self.distance_km < Decimal::ZERO {
            return Err(invalid_input("distance_km", "Distance cannot be negative"));
        }
        self.floor_request().validate()?;
        if self.contract_months == 0 {
            return Err(invalid_input("contract_months", "Contract length must be positive"));
        }
        validate_proposal(self.proposed_price, self.discount_percent)?;
        if self.existing_ratio < Decimal::ZERO || self.existing_ratio > Decimal::ONE {
            return Err(invalid_input(
                "existing_ratio",
                "Existing customer ratio must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Everything the audit log and verification documents need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCheckRecord {
    pub reference_id: Uuid,
    pub checked_at: DateTime<Utc>,
    pub config_name: String,

    pub segment: CustomerSegment,
    pub speed: Decimal,
    pub distance_km: Decimal,
    pub equipment: Vec<String>,
    pub contract_months: u32,
    pub has_fixed_ip: bool,
    pub proposed_price: Money,
    pub discount_percent: Decimal,
    pub existing_customer_ratio: Rate,
    pub new_customer_ratio: Rate,

    pub floor_existing: Money,
    pub floor_new: Money,
    pub floor_weighted: Money,

    pub discount_amount: Money,
    pub price_after_discount: Money,
    pub regulator_fee: Money,
    pub net_revenue: Money,

    pub margin_existing_baht: Money,
    pub margin_existing_percent: Decimal,
    pub is_valid_existing: bool,
    pub margin_new_baht: Money,
    pub margin_new_percent: Decimal,
    pub is_valid_new: bool,
    pub margin_weighted_baht: Money,
    pub margin_weighted_percent: Decimal,
    pub is_valid_weighted: bool,

    /// One-time fee disclosed to the customer
    pub installation_fee: Money,
    /// Installation cost amortised into the new-customer floor
    pub installation_cost: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PriceCheckRecord {
    /// The verdict printed on documents: proposed price against the blended floor.
    pub fn is_approved(&self) -> bool {
        self.is_valid_weighted
    }

    /// First 8 characters of the reference, used in document file names.
    pub fn short_reference(&self) -> String {
        self.reference_id.simple().to_string()[..8].to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCheckOutput {
    pub record: PriceCheckRecord,
    pub floors: WeightedFloorResult,
}

/// Run a full price check: weighted floor, net revenue, and margin against
/// each of the three floors.
pub fn run_price_check(
    config: &PricingConfig,
    request: &PriceCheckRequest,
) -> FloorPriceResult<ComputationOutput<PriceCheckOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    request.validate()?;

    let floors = compute_weighted_floor(config, &request.floor_request(), request.existing_ratio)?;
    let revenue = net_revenue(request.proposed_price, request.discount_percent);
    let existing = margin_against(&revenue, floors.floor_existing);
    let new = margin_against(&revenue, floors.floor_new);
    let weighted = margin_against(&revenue, floors.floor_weighted);

    for label in &floors.breakdown_existing.unknown_equipment {
        warnings.push(format!("Unknown equipment '{label}' priced at zero"));
    }
    if floors.breakdown_existing.discount_rate.is_zero() {
        warnings.push(format!(
            "No contract discount configured for {} months",
            request.contract_months
        ));
    }

    let record = PriceCheckRecord {
        reference_id: Uuid::new_v4(),
        checked_at: Utc::now(),
        config_name: config.config_name.clone(),
        segment: request.segment,
        speed: request.speed,
        distance_km: request.distance_km,
        equipment: floors.breakdown_existing.equipment.clone(),
        contract_months: request.contract_months,
        has_fixed_ip: request.has_fixed_ip,
        proposed_price: request.proposed_price,
        discount_percent: request.discount_percent,
        existing_customer_ratio: request.existing_ratio,
        new_customer_ratio: Decimal::ONE - request.existing_ratio,
        floor_existing: floors.floor_existing,
        floor_new: floors.floor_new,
        floor_weighted: floors.floor_weighted,
        discount_amount: revenue.discount_amount,
        price_after_discount: revenue.price_after_discount,
        regulator_fee: revenue.regulator_fee,
        net_revenue: revenue.net_revenue,
        margin_existing_baht: existing.margin_baht,
        margin_existing_percent: existing.margin_percent,
        is_valid_existing: existing.is_valid,
        margin_new_baht: new.margin_baht,
        margin_new_percent: new.margin_percent,
        is_valid_new: new.is_valid,
        margin_weighted_baht: weighted.margin_baht,
        margin_weighted_percent: weighted.margin_percent,
        is_valid_weighted: weighted.is_valid,
        installation_fee: installation_fee(config, request.segment),
        installation_cost: floors.breakdown_existing.installation.total_cost,
        notes: request.notes.clone(),
    };

    info!(
        reference_id = %record.reference_id,
        config = %record.config_name,
        segment = %record.segment,
        floor_weighted = %record.floor_weighted,
        net_revenue = %record.net_revenue,
        approved = record.is_valid_weighted,
        "price check completed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted floor price check (existing / new customer mix, 4% regulator fee)",
        &serde_json::json!({
            "config": config.config_name,
            "existing_ratio": request.existing_ratio.to_string(),
            "discount_percent": request.discount_percent.to_string(),
            "regulator_fee_rate": crate::revenue::REGULATOR_FEE_RATE.to_string(),
        }),
        warnings,
        elapsed,
        PriceCheckOutput { record, floors },
    ))
}

/// Result of the single-floor check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickCheckOutput {
    pub proposed_price: Money,
    pub floor_price: Money,
    pub is_valid: bool,
    /// Markup over the floor (legacy margin)
    pub margin_percent: Decimal,
    /// How far below the floor the proposal is; absent when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Money>,
    pub breakdown: FloorPriceBreakdown,
}

/// Legacy check: proposed price against the existing-customer floor only,
/// with the markup-over-floor margin. No discount, no fee.
pub fn quick_check(
    config: &PricingConfig,
    request: &FloorRequest,
    proposed_price: Money,
) -> FloorPriceResult<ComputationOutput<QuickCheckOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_amount("proposed_price", proposed_price)?;
    let breakdown = compute_floor(config, request)?;
    let floor_price = breakdown.floor_price;
    let is_valid = proposed_price >= floor_price;

    for label in &breakdown.unknown_equipment {
        warnings.push(format!("Unknown equipment '{label}' priced at zero"));
    }

    let output = QuickCheckOutput {
        proposed_price,
        floor_price,
        is_valid,
        margin_percent: simple_margin(proposed_price, floor_price),
        shortfall: (!is_valid).then(|| floor_price - proposed_price),
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single floor check (markup over floor)",
        &serde_json::json!({
            "config": config.config_name,
            "segment": request.segment,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FloorPriceError;

    fn request() -> PriceCheckRequest {
        PriceCheckRequest {
            segment: CustomerSegment::Residential,
            speed: dec!(500),
            distance_km: dec!(1),
            equipment: vec![],
            contract_months: 24,
            has_fixed_ip: false,
            proposed_price: dec!(599),
            discount_percent: Decimal::ZERO,
            existing_ratio: dec!(0.7),
            notes: Some("Condo promo".into()),
        }
    }

    #[test]
    fn test_price_check_margins_against_each_floor() {
        let config = PricingConfig::default();
        let out = run_price_check(&config, &request()).unwrap();
        let r = &out.result.record;

        assert_eq!(r.net_revenue, dec!(575.04));
        assert_eq!(r.regulator_fee, dec!(23.96));
        assert_eq!(r.margin_existing_baht, dec!(318.54));
        assert!(r.is_valid_existing);
        assert_eq!(r.margin_new_baht, dec!(-193.96));
        assert!(!r.is_valid_new);
        assert_eq!(r.margin_weighted_baht, dec!(164.79));
        assert!(r.is_approved());
        assert_eq!(r.new_customer_ratio, dec!(0.3));
        assert_eq!(r.installation_fee, dec!(500));
        assert_eq!(r.notes.as_deref(), Some("Condo promo"));
        assert_eq!(r.config_name, "default");
    }

    #[test]
    fn test_reference_ids_are_unique() {
        let config = PricingConfig::default();
        let a = run_price_check(&config, &request()).unwrap();
        let b = run_price_check(&config, &request()).unwrap();
        assert_ne!(a.result.record.reference_id, b.result.record.reference_id);
        assert_eq!(a.result.record.short_reference().len(), 8);
    }

    #[test]
    fn test_validation_rejects_out_of_range_inputs() {
        let config = PricingConfig::default();

        let mut req = request();
        req.existing_ratio = dec!(1.2);
        assert!(matches!(
            run_price_check(&config, &req),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "existing_ratio"
        ));

        let mut req = request();
        req.discount_percent = dec!(101);
        assert!(run_price_check(&config, &req).is_err());

        let mut req = request();
        req.contract_months = 0;
        assert!(run_price_check(&config, &req).is_err());

        let mut req = request();
        req.speed = Decimal::ZERO;
        assert!(run_price_check(&config, &req).is_err());
    }

    #[test]
    fn test_extreme_magnitudes_rejected_not_overflowed() {
        let config = PricingConfig::default();

        let mut req = request();
        req.distance_km = dec!(70000000000000000000000000000);
        assert!(matches!(
            run_price_check(&config, &req),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "distance_km"
        ));

        let mut req = request();
        req.speed = dec!(50000000000000000000000000000);
        assert!(matches!(
            run_price_check(&config, &req),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "speed"
        ));

        let mut req = request();
        req.proposed_price = dec!(70000000000000000000000000000);
        assert!(matches!(
            run_price_check(&config, &req),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "proposed_price"
        ));

        let floor_req = request().floor_request();
        assert!(quick_check(&config, &floor_req, dec!(70000000000000000000000000000)).is_err());
    }

    #[test]
    fn test_unlisted_contract_length_warns() {
        let config = PricingConfig::default();
        let mut req = request();
        req.contract_months = 6;
        let out = run_price_check(&config, &req).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("6 months")));
    }

    #[test]
    fn test_default_ratio_when_omitted() {
        let json = r#"{
            "segment": "business",
            "speed": 1000,
            "contract_months": 36,
            "proposed_price": "2500"
        }"#;
        let req: PriceCheckRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.existing_ratio, dec!(0.7));
        assert_eq!(req.discount_percent, Decimal::ZERO);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_quick_check_reports_shortfall() {
        let config = PricingConfig::default();
        let req = request().floor_request();

        let ok = quick_check(&config, &req, dec!(300)).unwrap().result;
        assert!(ok.is_valid);
        assert!(ok.shortfall.is_none());
        // (300 - 256.5) / 256.5
        assert_eq!(ok.margin_percent, dec!(16.96));

        let low = quick_check(&config, &req, dec!(250)).unwrap().result;
        assert!(!low.is_valid);
        assert_eq!(low.shortfall, Some(dec!(6.50)));
    }
}
