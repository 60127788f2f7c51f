use floor_price_core::config::{CachedProvider, ConfigRegistry, StaticProvider};
use floor_price_core::pricing::{compute_floor, FloorRequest};
use floor_price_core::{resolve_snapshot, CustomerSegment, FloorPriceError, PricingConfig};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn request() -> FloorRequest {
    FloorRequest {
        segment: CustomerSegment::Residential,
        speed: dec!(500),
        distance_km: dec!(0.2),
        equipment: vec![],
        contract_months: 24,
        has_fixed_ip: false,
    }
}

/// Default catalog with every residential speed price raised by 100.
fn promo_config() -> PricingConfig {
    let mut config = PricingConfig::default().duplicate("promo-2025", Some("pricing-team"));
    for price in config.speed_prices.residential.values_mut() {
        *price += dec!(100);
    }
    config
}

// ===========================================================================
// Snapshot resolution
// ===========================================================================

#[test]
fn test_nothing_active_falls_back_to_default() {
    let snapshot = resolve_snapshot(&StaticProvider::empty()).unwrap();
    assert_eq!(snapshot.config_name, "default");
    let b = compute_floor(&snapshot, &request()).unwrap();
    assert_eq!(b.floor_price, dec!(256.50));
}

#[test]
fn test_activation_changes_the_floor() {
    let mut registry = ConfigRegistry::new();
    registry.insert(PricingConfig::default()).unwrap();
    registry.insert(promo_config()).unwrap();

    registry.activate("default").unwrap();
    let before = resolve_snapshot(&registry).unwrap();
    registry.activate("promo-2025").unwrap();
    let after = resolve_snapshot(&registry).unwrap();

    assert_eq!(compute_floor(&before, &request()).unwrap().floor_price, dec!(256.50));
    // (285 + 100) * 0.9
    assert_eq!(compute_floor(&after, &request()).unwrap().floor_price, dec!(346.50));
    // Earlier snapshot is untouched by the switch
    assert_eq!(before.config_name, "default");
}

#[test]
fn test_active_configuration_cannot_be_deleted() {
    let mut registry = ConfigRegistry::new();
    registry.insert(promo_config()).unwrap();
    registry.activate("promo-2025").unwrap();

    let err = registry.remove("promo-2025").unwrap_err();
    assert!(matches!(err, FloorPriceError::InvalidInput { .. }));

    registry.deactivate();
    assert!(registry.remove("promo-2025").is_ok());
    assert_eq!(registry.names().count(), 0);
}

#[test]
fn test_duplicate_is_inactive_copy() {
    let mut registry = ConfigRegistry::new();
    registry.insert(PricingConfig::default()).unwrap();
    registry.activate("default").unwrap();
    registry.duplicate("default", "draft", None).unwrap();

    assert_eq!(registry.active_name(), Some("default"));
    let draft = registry.get("draft").unwrap();
    assert_eq!(draft.speed_prices, PricingConfig::default().speed_prices);
    assert!(registry.duplicate("default", "draft", None).is_err());
}

#[test]
fn test_cached_registry_sees_activation_through_inner_mut() {
    let mut registry = ConfigRegistry::new();
    registry.insert(PricingConfig::default()).unwrap();
    registry.insert(promo_config()).unwrap();
    registry.activate("default").unwrap();

    let mut cached = CachedProvider::new(registry);
    assert_eq!(resolve_snapshot(&cached).unwrap().config_name, "default");

    cached.inner_mut().activate("promo-2025").unwrap();
    assert_eq!(resolve_snapshot(&cached).unwrap().config_name, "promo-2025");
}

// ===========================================================================
// Export format
// ===========================================================================

#[test]
fn test_export_shape() {
    let json = PricingConfig::default().to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["config_name"], "default");
    assert!(value["speed_prices"]["residential"]["500"].is_string());
    assert!(value["installation_pricing"]["business"]["base_length_m"].is_string());
    assert!(value["installation_pricing"]["extra_cost_per_meter"].is_string());
    assert!(value["contract_discounts"]["business"]["36"].is_string());
    assert!(value.get("created_by").is_none());
}

#[test]
fn test_export_reimports_identically() {
    let original = promo_config();
    let reloaded = PricingConfig::from_json_str(&original.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reloaded, original);
}

#[test]
fn test_import_rejects_full_discount() {
    let mut value = serde_json::to_value(PricingConfig::default()).unwrap();
    value["contract_discounts"]["residential"]["12"] = serde_json::json!(1);
    let err = PricingConfig::from_json_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, FloorPriceError::Configuration(_)));
}
