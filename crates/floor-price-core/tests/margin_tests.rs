use floor_price_core::price_check::{quick_check, run_price_check, PriceCheckRequest};
use floor_price_core::revenue::{margin, net_revenue, simple_margin, REGULATOR_FEE_RATE};
use floor_price_core::{CustomerSegment, FloorPriceError, PricingConfig};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Net revenue
// ===========================================================================

#[test]
fn test_net_revenue_order_of_operations() {
    let r = net_revenue(dec!(1000), dec!(10));
    assert_eq!(r.discount_amount, dec!(100));
    assert_eq!(r.price_after_discount, dec!(900));
    assert_eq!(r.regulator_fee, dec!(36));
    assert_eq!(r.net_revenue, dec!(864));

    // Fee on the gross price would have been 40
    assert_ne!(r.regulator_fee, dec!(1000) * REGULATOR_FEE_RATE);
}

#[test]
fn test_net_revenue_rounds_to_satang() {
    let r = net_revenue(dec!(599), dec!(8));
    // 599 * 0.92 = 551.08; fee 22.0432; net 529.0368
    assert_eq!(r.discount_amount, dec!(47.92));
    assert_eq!(r.price_after_discount, dec!(551.08));
    assert_eq!(r.regulator_fee, dec!(22.04));
    assert_eq!(r.net_revenue, dec!(529.04));
}

// ===========================================================================
// Margins
// ===========================================================================

#[test]
fn test_margin_valid_at_equality() {
    let m = margin(dec!(1000), dec!(864), dec!(10));
    assert!(m.is_valid);
    assert_eq!(m.margin_baht, Decimal::ZERO);
}

#[test]
fn test_margin_one_satang_short_is_invalid() {
    let m = margin(dec!(1000), dec!(864.01), dec!(10));
    assert!(!m.is_valid);
    assert_eq!(m.margin_baht, dec!(-0.01));
}

#[test]
fn test_margin_percent_uses_revenue_denominator() {
    let m = margin(dec!(1000), dec!(648), dec!(10));
    // (864 - 648) / 864 = 25%
    assert_eq!(m.margin_percent, dec!(25));
    // over the floor it would have been 33.33%
    assert_eq!(simple_margin(dec!(864), dec!(648)), dec!(33.33));
}

#[test]
fn test_simple_margin_zero_floor() {
    assert_eq!(simple_margin(dec!(500), Decimal::ZERO), Decimal::ZERO);
}

// ===========================================================================
// Full price check
// ===========================================================================

fn business_request() -> PriceCheckRequest {
    PriceCheckRequest {
        segment: CustomerSegment::Business,
        speed: dec!(1000),
        distance_km: dec!(0.4),
        equipment: vec!["ONU Huawei HG8145X6 (AX3000 + 1POTS)".into()],
        contract_months: 36,
        has_fixed_ip: true,
        proposed_price: dec!(2200),
        discount_percent: dec!(5),
        existing_ratio: dec!(0.6),
        notes: None,
    }
}

#[test]
fn test_business_price_check() {
    let config = PricingConfig::default();
    let out = run_price_check(&config, &business_request()).unwrap();
    let r = &out.result.record;

    // (1290 + 300 + 35) * 1.1 = 1787.5; less 12% = 1573
    assert_eq!(r.floor_existing, dec!(1573));
    // 400 m within the 500 m base: 3500 / 36 = 97.22
    assert_eq!(r.floor_new, dec!(1670.22));
    // 1573 * 0.6 + 1670.22 * 0.4 = 943.8 + 668.088
    assert_eq!(r.floor_weighted, dec!(1611.89));
    // 2200 * 0.95 = 2090; fee 83.6
    assert_eq!(r.net_revenue, dec!(2006.40));
    assert!(r.is_valid_existing && r.is_valid_new && r.is_valid_weighted);
    assert_eq!(r.margin_weighted_baht, dec!(394.51));
    assert_eq!(r.installation_fee, dec!(1500));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_price_check_rejects_negative_price() {
    let config = PricingConfig::default();
    let mut req = business_request();
    req.proposed_price = dec!(-1);
    let err = run_price_check(&config, &req).unwrap_err();
    assert!(matches!(err, FloorPriceError::InvalidInput { .. }));
}

#[test]
fn test_price_check_rejects_distance_beyond_decimal_range() {
    let config = PricingConfig::default();
    let mut req = business_request();
    req.distance_km = dec!(70000000000000000000000000000);
    let err = run_price_check(&config, &req).unwrap_err();
    assert!(matches!(err, FloorPriceError::InvalidInput { ref field, .. } if field == "distance_km"));
}

#[test]
fn test_price_check_rejects_huge_proposed_price() {
    let config = PricingConfig::default();
    let mut req = business_request();
    req.proposed_price = dec!(79228162514264337593543950335);
    let err = run_price_check(&config, &req).unwrap_err();
    assert!(matches!(err, FloorPriceError::InvalidInput { ref field, .. } if field == "proposed_price"));
}

#[test]
fn test_price_check_warns_on_unknown_equipment() {
    let config = PricingConfig::default();
    let mut req = business_request();
    req.equipment.push("Legacy Modem".into());
    let out = run_price_check(&config, &req).unwrap();
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("Legacy Modem"));
    // Unknown label did not move the floor
    assert_eq!(out.result.record.floor_existing, dec!(1573));
}

#[test]
fn test_quick_check_ignores_discount_and_fee() {
    let config = PricingConfig::default();
    let req = business_request();
    let out = quick_check(&config, &req.floor_request(), dec!(1573)).unwrap();
    assert!(out.result.is_valid);
    assert_eq!(out.result.margin_percent, Decimal::ZERO);
}
