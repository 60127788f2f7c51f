use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::installation::{compute_installation, validate_distance, InstallationDetails};
use super::speed::{quote_speed, InterpolationInfo};
use crate::config::PricingConfig;
use crate::error::invalid_input;
use crate::types::{round_money, CustomerSegment, Money, Rate, MAX_SPEED_MBPS};
use crate::FloorPriceResult;

/// Package parameters that determine the floor price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRequest {
    pub segment: CustomerSegment,
    /// Requested speed in Mbps; need not be a catalog speed
    pub speed: Decimal,
    /// Installation distance in kilometers
    #[serde(default)]
    pub distance_km: Decimal,
    /// Selected equipment labels
    #[serde(default)]
    pub equipment: Vec<String>,
    pub contract_months: u32,
    #[serde(default)]
    pub has_fixed_ip: bool,
}

impl FloorRequest {
    /// Speed within `(0, MAX_SPEED_MBPS]` and distance at most `MAX_DISTANCE_KM`.
    /// Negative distances are allowed and priced as zero.
    pub fn validate(&self) -> FloorPriceResult<()> {
        if self.speed <= Decimal::ZERO || self.speed > Decimal::from(MAX_SPEED_MBPS) {
            return Err(invalid_input(
                "speed",
                format!("Speed must be above 0 and at most {MAX_SPEED_MBPS} Mbps"),
            ));
        }
        validate_distance(self.distance_km)
    }
}

/// Every stage of the floor price pipeline, rounded to 2 dp for disclosure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPriceBreakdown {
    pub segment: CustomerSegment,
    pub speed: Decimal,
    /// Speed price after interpolation / extrapolation
    pub base_price: Money,
    pub interpolation: InterpolationInfo,
    /// Disclosed only; not part of this floor unless `installation_included`
    pub installation: InstallationDetails,
    pub fixed_ip_cost: Money,
    pub equipment_cost: Money,
    /// Equipment labels priced (duplicates removed)
    pub equipment: Vec<String>,
    /// Labels missing from the catalog, priced at zero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_equipment: Vec<String>,
    pub subtotal_before_adjustments: Money,
    pub business_premium: Money,
    pub subtotal_with_premium: Money,
    pub contract_months: u32,
    pub discount_rate: Rate,
    pub discount_amount: Money,
    pub installation_included: bool,
    /// Installation total spread over the contract; zero when not included
    pub amortized_installation: Money,
    pub floor_price: Money,
}

/// Monthly floor price for a package, excluding installation.
///
/// Pipeline: speed price, installation (recorded only), fixed IP, equipment,
/// subtotal, business premium, contract discount, floor. Intermediate values
/// are carried unrounded; every reported figure is rounded to 2 dp.
pub fn compute_floor(
    config: &PricingConfig,
    request: &FloorRequest,
) -> FloorPriceResult<FloorPriceBreakdown> {
    request.validate()?;
    let segment = request.segment;

    // 1. Speed
    let quote = quote_speed(config.speed_table(segment), segment, request.speed)?;

    // 2. Installation, disclosed but kept out of this floor
    let installation = compute_installation(config, segment, request.distance_km);

    // 3. Fixed IP
    let fixed_ip_cost = if request.has_fixed_ip {
        config.fixed_ip_price(segment)
    } else {
        Decimal::ZERO
    };

    // 4. Equipment
    let mut equipment: Vec<String> = Vec::with_capacity(request.equipment.len());
    let mut unknown_equipment = Vec::new();
    let mut equipment_cost = Decimal::ZERO;
    for label in &request.equipment {
        if equipment.contains(label) {
            continue;
        }
        match config.equipment_price(label) {
            Some(price) => equipment_cost += price,
            None => {
                warn!(label = %label, config = %config.config_name, "unknown equipment label priced at zero");
                unknown_equipment.push(label.clone());
            }
        }
        equipment.push(label.clone());
    }

    // 5. Subtotal
    let subtotal = quote.price + fixed_ip_cost + equipment_cost;

    // 6. Business premium
    let business_premium = match segment {
        CustomerSegment::Business => subtotal * config.business_premium_percent,
        CustomerSegment::Residential => Decimal::ZERO,
    };
    let subtotal_with_premium = subtotal + business_premium;

    // 7. Contract discount (exact key, no interpolation between lengths)
    let discount_rate = config.contract_discount(segment, request.contract_months);
    let discount_amount = subtotal_with_premium * discount_rate;

    // 8. Floor
    let floor_price = round_money(subtotal_with_premium - discount_amount);

    debug!(
        %segment,
        speed = %request.speed,
        base_price = %quote.price,
        subtotal = %subtotal,
        discount_rate = %discount_rate,
        floor_price = %floor_price,
        "computed floor price"
    );

    Ok(FloorPriceBreakdown {
        segment,
        speed: request.speed,
        base_price: round_money(quote.price),
        interpolation: quote.info,
        installation,
        fixed_ip_cost: round_money(fixed_ip_cost),
        equipment_cost: round_money(equipment_cost),
        equipment,
        unknown_equipment,
        subtotal_before_adjustments: round_money(subtotal),
        business_premium: round_money(business_premium),
        subtotal_with_premium: round_money(subtotal_with_premium),
        contract_months: request.contract_months,
        discount_rate,
        discount_amount: round_money(discount_amount),
        installation_included: false,
        amortized_installation: Decimal::ZERO,
        floor_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FloorPriceError;
    use rust_decimal_macros::dec;

    fn request(segment: CustomerSegment, speed: Decimal) -> FloorRequest {
        FloorRequest {
            segment,
            speed,
            distance_km: dec!(1),
            equipment: vec![],
            contract_months: 24,
            has_fixed_ip: false,
        }
    }

    #[test]
    fn test_residential_catalog_speed_pipeline() {
        let config = PricingConfig::default();
        let b = compute_floor(&config, &request(CustomerSegment::Residential, dec!(500))).unwrap();

        assert_eq!(b.base_price, dec!(285));
        assert!(!b.interpolation.interpolated);
        assert_eq!(b.subtotal_before_adjustments, dec!(285));
        assert_eq!(b.business_premium, Decimal::ZERO);
        assert_eq!(b.discount_rate, dec!(0.10));
        assert_eq!(b.discount_amount, dec!(28.50));
        assert_eq!(b.floor_price, dec!(256.50));
        // Installation is disclosed but not in the floor
        assert_eq!(b.installation.total_cost, dec!(12300));
        assert!(!b.installation_included);
    }

    #[test]
    fn test_business_premium_then_discount() {
        let config = PricingConfig::default();
        let mut req = request(CustomerSegment::Business, dec!(300));
        req.has_fixed_ip = true;
        req.equipment = vec!["Managed Switch 8 Port".into()];
        req.contract_months = 36;
        let b = compute_floor(&config, &req).unwrap();

        // 650 + 300 + 60 = 1010; premium 101; 1111 * 0.12 = 133.32
        assert_eq!(b.subtotal_before_adjustments, dec!(1010));
        assert_eq!(b.business_premium, dec!(101));
        assert_eq!(b.subtotal_with_premium, dec!(1111));
        assert_eq!(b.discount_amount, dec!(133.32));
        assert_eq!(b.floor_price, dec!(977.68));
    }

    #[test]
    fn test_unknown_equipment_is_free_and_reported() {
        let config = PricingConfig::default();
        let mut req = request(CustomerSegment::Residential, dec!(500));
        req.equipment = vec![
            "WiFi 6 Router (AX.3000)".into(),
            "Wifi6 router typo".into(),
        ];
        let b = compute_floor(&config, &req).unwrap();
        assert_eq!(b.equipment_cost, dec!(30));
        assert_eq!(b.unknown_equipment, vec!["Wifi6 router typo".to_string()]);
    }

    #[test]
    fn test_duplicate_equipment_counted_once() {
        let config = PricingConfig::default();
        let mut req = request(CustomerSegment::Residential, dec!(500));
        req.equipment = vec!["Mesh WiFi 6 Node".into(), "Mesh WiFi 6 Node".into()];
        let b = compute_floor(&config, &req).unwrap();
        assert_eq!(b.equipment_cost, dec!(45));
        assert_eq!(b.equipment.len(), 1);
    }

    #[test]
    fn test_unlisted_contract_length_has_no_discount() {
        let config = PricingConfig::default();
        let mut req = request(CustomerSegment::Residential, dec!(500));
        req.contract_months = 18;
        let b = compute_floor(&config, &req).unwrap();
        assert_eq!(b.discount_rate, Decimal::ZERO);
        assert_eq!(b.floor_price, dec!(285));
    }

    #[test]
    fn test_interpolated_base_rounded_in_breakdown() {
        let config = PricingConfig::default();
        // 301 between 300 (235) and 500 (285): 235.25
        let mut req = request(CustomerSegment::Residential, dec!(301));
        req.contract_months = 12;
        let b = compute_floor(&config, &req).unwrap();
        assert_eq!(b.base_price, dec!(235.25));
        // 235.25 * 0.95 = 223.4875
        assert_eq!(b.floor_price, dec!(223.49));
    }

    #[test]
    fn test_idempotent() {
        let config = PricingConfig::default();
        let req = request(CustomerSegment::Business, dec!(1500));
        let a = compute_floor(&config, &req).unwrap();
        let b = compute_floor(&config, &req).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.floor_price.to_string(), b.floor_price.to_string());
    }

    #[test]
    fn test_empty_segment_table_fails() {
        let mut config = PricingConfig::default();
        config.speed_prices.business.clear();
        let err = compute_floor(&config, &request(CustomerSegment::Business, dec!(100))).unwrap_err();
        assert!(matches!(err, FloorPriceError::Configuration(_)));
    }
}
