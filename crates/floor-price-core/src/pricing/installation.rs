use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::error::invalid_input;
use crate::types::{round_money, CustomerSegment, Money, MAX_DISTANCE_KM};
use crate::FloorPriceResult;

const METERS_PER_KM: Decimal = dec!(1000);

/// One-time installation cost for a given cable distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationDetails {
    pub base_cost: Money,
    /// Cable length covered by the base cost
    pub base_length_m: Decimal,
    /// Requested distance converted to meters
    pub distance_m: Decimal,
    /// Meters beyond the included length
    pub extra_distance_m: Decimal,
    pub extra_cost: Money,
    pub total_cost: Money,
}

/// Distances above `MAX_DISTANCE_KM` are rejected. Negative distances pass
/// and are priced as zero.
pub fn validate_distance(distance_km: Decimal) -> FloorPriceResult<()> {
    if distance_km > MAX_DISTANCE_KM {
        return Err(invalid_input(
            "distance_km",
            format!("Distance must be at most {MAX_DISTANCE_KM} km"),
        ));
    }
    Ok(())
}

/// Installation cost for `distance_km` kilometers of cable.
///
/// Callers always pass kilometers; conversion to meters happens here.
/// Negative distances are treated as zero, and distances beyond
/// `MAX_DISTANCE_KM` (which request validation rejects) are held at it.
pub fn compute_installation(
    config: &PricingConfig,
    segment: CustomerSegment,
    distance_km: Decimal,
) -> InstallationDetails {
    let base = config.installation_base(segment);
    let per_meter = config.installation_pricing.extra_cost_per_meter;

    let distance_m = distance_km.clamp(Decimal::ZERO, MAX_DISTANCE_KM) * METERS_PER_KM;
    let extra_distance_m = (distance_m - base.base_length_m).max(Decimal::ZERO);
    let extra_cost = extra_distance_m * per_meter;
    let total_cost = base.base_cost + extra_cost;

    InstallationDetails {
        base_cost: round_money(base.base_cost),
        base_length_m: base.base_length_m,
        distance_m: distance_m.normalize(),
        extra_distance_m: extra_distance_m.normalize(),
        extra_cost: round_money(extra_cost),
        total_cost: round_money(total_cost),
    }
}

/// The one-time fee disclosed to the customer. This is a display value and
/// is unrelated to the amortised installation cost.
pub fn installation_fee(config: &PricingConfig, segment: CustomerSegment) -> Money {
    round_money(config.installation_fee(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_within_base_length_costs_base_only() {
        let config = PricingConfig::default();
        // 0.25 km = 250 m, residential includes 300 m
        let d = compute_installation(&config, CustomerSegment::Residential, dec!(0.25));
        assert_eq!(d.distance_m, dec!(250));
        assert_eq!(d.extra_distance_m, Decimal::ZERO);
        assert_eq!(d.extra_cost, Decimal::ZERO);
        assert_eq!(d.total_cost, dec!(1800));
    }

    #[test]
    fn test_extra_meters_charged_per_meter() {
        let config = PricingConfig::default();
        let d = compute_installation(&config, CustomerSegment::Residential, dec!(1));
        assert_eq!(
            d,
            InstallationDetails {
                base_cost: dec!(1800),
                base_length_m: dec!(300),
                distance_m: dec!(1000),
                extra_distance_m: dec!(700),
                extra_cost: dec!(10500),
                total_cost: dec!(12300),
            }
        );
    }

    #[test]
    fn test_business_uses_its_own_base() {
        let config = PricingConfig::default();
        // 0.315 km = 315 m, business includes 500 m
        let d = compute_installation(&config, CustomerSegment::Business, dec!(0.315));
        assert_eq!(d.total_cost, dec!(3500));
        assert_eq!(d.extra_distance_m, Decimal::ZERO);
    }

    #[test]
    fn test_negative_distance_clamped() {
        let config = PricingConfig::default();
        let d = compute_installation(&config, CustomerSegment::Residential, dec!(-2));
        assert_eq!(d.distance_m, Decimal::ZERO);
        assert_eq!(d.total_cost, dec!(1800));
    }

    #[test]
    fn test_distance_limit() {
        assert!(validate_distance(MAX_DISTANCE_KM).is_ok());
        assert!(validate_distance(dec!(-3)).is_ok());
        assert!(validate_distance(dec!(10000.01)).is_err());
    }

    #[test]
    fn test_installation_fee_is_disclosure_value() {
        let config = PricingConfig::default();
        assert_eq!(installation_fee(&config, CustomerSegment::Residential), dec!(500));
        assert_eq!(installation_fee(&config, CustomerSegment::Business), dec!(1500));
    }
}
