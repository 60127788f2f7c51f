use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::FloorPriceError;
use crate::types::{BySegment, CustomerSegment, Mbps, Money, Rate, MAX_AMOUNT, MAX_SPEED_MBPS};
use crate::FloorPriceResult;

/// Name carried by the compiled-in configuration.
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Longest included cable length a configuration may declare (10,000 km).
const MAX_BASE_LENGTH_M: Decimal = dec!(10000000);

/// Installation cost base for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationBase {
    /// One-time cost covering the included cable length
    pub base_cost: Money,
    /// Cable length included in the base cost, in meters
    pub base_length_m: Decimal,
}

/// Installation cost model shared by both segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationPricing {
    pub residential: InstallationBase,
    pub business: InstallationBase,
    /// Cost per meter beyond the included length (same for every segment)
    pub extra_cost_per_meter: Money,
}

impl InstallationPricing {
    pub fn base(&self, segment: CustomerSegment) -> &InstallationBase {
        match segment {
            CustomerSegment::Residential => &self.residential,
            CustomerSegment::Business => &self.business,
        }
    }
}

/// Immutable pricing configuration snapshot.
///
/// Integer-keyed tables deserialize from JSON objects with string keys
/// (`{"100": 190}`), so a stored configuration is parsed into typed maps once,
/// at load time. Call [`PricingConfig::validate`] (or load through
/// [`PricingConfig::from_json_str`]) before handing a hand-built snapshot to
/// the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub config_name: String,
    /// Monthly price per catalog speed (Mbps)
    pub speed_prices: BySegment<BTreeMap<Mbps, Money>>,
    pub installation_pricing: InstallationPricing,
    /// Monthly fixed-IP add-on price
    pub fixed_ip: BySegment<Option<Money>>,
    /// Monthly cost per equipment label
    #[serde(default)]
    pub equipment_prices: BTreeMap<String, Money>,
    /// Contract length in months -> discount fraction
    #[serde(default)]
    pub contract_discounts: BySegment<BTreeMap<u32, Rate>>,
    /// Premium fraction applied to business subtotals (0.10 = 10%)
    pub business_premium_percent: Rate,
    /// One-time installation fee disclosed to the customer
    pub installation_fee: BySegment<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PricingConfig {
    /// Parse and validate a configuration exported as JSON.
    pub fn from_json_str(json: &str) -> FloorPriceResult<Self> {
        let config: PricingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> FloorPriceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy of this configuration under a new name, with metadata reset.
    pub fn duplicate(&self, new_name: &str, created_by: Option<&str>) -> Self {
        let mut copy = self.clone();
        copy.config_name = new_name.to_string();
        copy.notes = Some(format!("Duplicated from {}", self.config_name));
        copy.created_by = created_by.map(str::to_string);
        copy.created_at = Some(Utc::now());
        copy
    }

    pub fn speed_table(&self, segment: CustomerSegment) -> &BTreeMap<Mbps, Money> {
        self.speed_prices.get(segment)
    }

    /// Fixed-IP price for a segment, falling back to the residential entry
    /// and then to zero.
    pub fn fixed_ip_price(&self, segment: CustomerSegment) -> Money {
        if let Some(price) = self.fixed_ip.get(segment) {
            return *price;
        }
        match self.fixed_ip.residential {
            Some(price) => {
                warn!(%segment, config = %self.config_name, "no fixed-IP price for segment, using residential price");
                price
            }
            None => {
                warn!(%segment, config = %self.config_name, "no fixed-IP price configured, using zero");
                Decimal::ZERO
            }
        }
    }

    /// Discount fraction for an exact contract length; zero when absent.
    pub fn contract_discount(&self, segment: CustomerSegment, contract_months: u32) -> Rate {
        self.contract_discounts
            .get(segment)
            .get(&contract_months)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn equipment_price(&self, label: &str) -> Option<Money> {
        self.equipment_prices.get(label).copied()
    }

    pub fn installation_base(&self, segment: CustomerSegment) -> &InstallationBase {
        self.installation_pricing.base(segment)
    }

    pub fn installation_fee(&self, segment: CustomerSegment) -> Money {
        *self.installation_fee.get(segment)
    }

    /// Check every table once so the engine can trust the snapshot.
    pub fn validate(&self) -> FloorPriceResult<()> {
        if self.config_name.trim().is_empty() {
            return Err(config_error("config_name must not be empty"));
        }

        for (segment, table) in self.speed_prices.iter() {
            if table.is_empty() {
                return Err(config_error(format!(
                    "speed_prices.{segment} must contain at least one speed"
                )));
            }
            for (speed, price) in table {
                if *speed == 0 || *speed > MAX_SPEED_MBPS {
                    return Err(config_error(format!(
                        "speed_prices.{segment} speed key {speed} is outside 1..={MAX_SPEED_MBPS}"
                    )));
                }
                check_amount(format!("speed_prices.{segment}[{speed}]"), *price)?;
            }
        }

        for segment in CustomerSegment::ALL {
            let base = self.installation_base(segment);
            check_amount(format!("installation_pricing.{segment}.base_cost"), base.base_cost)?;
            if base.base_length_m < Decimal::ZERO || base.base_length_m > MAX_BASE_LENGTH_M {
                return Err(config_error(format!(
                    "installation_pricing.{segment}.base_length_m = {} is outside [0, {MAX_BASE_LENGTH_M}]",
                    base.base_length_m
                )));
            }
        }
        check_amount(
            "installation_pricing.extra_cost_per_meter",
            self.installation_pricing.extra_cost_per_meter,
        )?;

        for (segment, price) in self.fixed_ip.iter() {
            if let Some(p) = price {
                check_amount(format!("fixed_ip.{segment}"), *p)?;
            }
        }

        for (label, price) in &self.equipment_prices {
            check_amount(format!("equipment_prices['{label}']"), *price)?;
        }

        for (segment, table) in self.contract_discounts.iter() {
            for (months, rate) in table {
                if *months == 0 {
                    return Err(config_error(format!(
                        "contract_discounts.{segment} contains a zero-month key"
                    )));
                }
                if *rate < Decimal::ZERO || *rate >= Decimal::ONE {
                    return Err(config_error(format!(
                        "contract_discounts.{segment}[{months}] = {rate} is outside [0, 1)"
                    )));
                }
            }
        }

        if self.business_premium_percent < Decimal::ZERO
            || self.business_premium_percent > Decimal::ONE
        {
            return Err(config_error(format!(
                "business_premium_percent = {} is outside [0, 1]",
                self.business_premium_percent
            )));
        }

        for (segment, fee) in self.installation_fee.iter() {
            check_amount(format!("installation_fee.{segment}"), *fee)?;
        }

        Ok(())
    }
}

fn config_error(msg: impl Into<String>) -> FloorPriceError {
    FloorPriceError::Configuration(msg.into())
}

/// Money values in a configuration must lie in `[0, MAX_AMOUNT]`.
fn check_amount(path: impl std::fmt::Display, value: Money) -> FloorPriceResult<()> {
    if value < Decimal::ZERO || value > MAX_AMOUNT {
        return Err(config_error(format!(
            "{path} = {value} is outside [0, {MAX_AMOUNT}]"
        )));
    }
    Ok(())
}

impl Default for PricingConfig {
    /// The compiled-in configuration used when nothing is active.
    fn default() -> Self {
        let residential_speeds = BTreeMap::from([
            (100, dec!(190)),
            (300, dec!(235)),
            (500, dec!(285)),
            (1000, dec!(385)),
            (2000, dec!(585)),
        ]);
        let business_speeds = BTreeMap::from([
            (100, dec!(450)),
            (300, dec!(650)),
            (500, dec!(850)),
            (1000, dec!(1290)),
            (2000, dec!(1990)),
        ]);

        let equipment_prices = [
            ("ONU ZTE F612 (No WiFi + 1POTS)", dec!(15)),
            ("ONU Huawei HG8145X6 (AX3000 + 1POTS)", dec!(35)),
            ("WiFi 6 Router (AX.3000)", dec!(30)),
            ("WiFi 6 Router (AX.1200)", dec!(18)),
            ("Mesh WiFi 6 Node", dec!(45)),
            ("Managed Switch 8 Port", dec!(60)),
        ]
        .into_iter()
        .map(|(label, price)| (label.to_string(), price))
        .collect();

        PricingConfig {
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            speed_prices: BySegment::new(residential_speeds, business_speeds),
            installation_pricing: InstallationPricing {
                residential: InstallationBase {
                    base_cost: dec!(1800),
                    base_length_m: dec!(300),
                },
                business: InstallationBase {
                    base_cost: dec!(3500),
                    base_length_m: dec!(500),
                },
                extra_cost_per_meter: dec!(15),
            },
            fixed_ip: BySegment::new(Some(dec!(200)), Some(dec!(300))),
            equipment_prices,
            contract_discounts: BySegment::new(
                BTreeMap::from([(12, dec!(0.05)), (24, dec!(0.10)), (36, dec!(0.15))]),
                BTreeMap::from([(12, dec!(0.03)), (24, dec!(0.07)), (36, dec!(0.12))]),
            ),
            business_premium_percent: dec!(0.10),
            installation_fee: BySegment::new(dec!(500), dec!(1500)),
            notes: Some("Compiled-in default configuration".to_string()),
            created_by: None,
            created_at: None,
        }
    }
}
