use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::PricingConfig;
use crate::error::{invalid_input, FloorPriceError};
use crate::pricing::{compute_weighted_floor, validate_distance, FloorRequest};
use crate::revenue::{margin_against, net_revenue, validate_amount};
use crate::types::{with_metadata, ComputationOutput, CustomerSegment, Mbps, Money, Rate};
use crate::FloorPriceResult;

/// Parameters shared by every row of a comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonParams {
    pub segment: CustomerSegment,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub contract_months: u32,
    #[serde(default)]
    pub has_fixed_ip: bool,
    /// Share of existing customers, within [0, 1]
    pub existing_ratio: Rate,
    /// Sales discount applied to every proposed price (percent)
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Optional proposed price per catalog speed
    #[serde(default)]
    pub proposed_prices: BTreeMap<Mbps, Money>,
}

/// One catalog speed in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub speed: Mbps,
    pub floor_existing: Money,
    pub floor_new: Money,
    pub floor_weighted: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_revenue: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_baht: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_valid: Option<bool>,
}

/// Weighted floors across a segment's catalog speeds, ascending.
///
/// Rows are computed lazily; iterating again starts over from the lowest speed.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonTable<'a> {
    config: &'a PricingConfig,
    params: &'a ComparisonParams,
}

impl<'a> ComparisonTable<'a> {
    pub fn new(config: &'a PricingConfig, params: &'a ComparisonParams) -> FloorPriceResult<Self> {
        if config.speed_table(params.segment).is_empty() {
            return Err(FloorPriceError::Configuration(format!(
                "No speed prices configured for {} customers",
                params.segment
            )));
        }
        if params.contract_months == 0 {
            return Err(invalid_input("contract_months", "Contract length must be positive"));
        }
        validate_distance(params.distance_km)?;
        if params.existing_ratio < Decimal::ZERO || params.existing_ratio > Decimal::ONE {
            return Err(invalid_input(
                "existing_ratio",
                "Existing customer ratio must be between 0 and 1",
            ));
        }
        if params.discount_percent < Decimal::ZERO || params.discount_percent > dec!(100) {
            return Err(invalid_input("discount_percent", "Discount must be between 0 and 100"));
        }
        for proposed in params.proposed_prices.values() {
            validate_amount("proposed_price", *proposed)?;
        }
        Ok(Self { config, params })
    }

    pub fn len(&self) -> usize {
        self.config.speed_table(self.params.segment).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> ComparisonRows<'a> {
        let config: &'a PricingConfig = self.config;
        ComparisonRows {
            table: *self,
            speeds: config.speed_table(self.params.segment).keys(),
        }
    }

    fn row(&self, speed: Mbps) -> FloorPriceResult<ComparisonRow> {
        let request = FloorRequest {
            segment: self.params.segment,
            speed: Decimal::from(speed),
            distance_km: self.params.distance_km,
            equipment: self.params.equipment.clone(),
            contract_months: self.params.contract_months,
            has_fixed_ip: self.params.has_fixed_ip,
        };
        let weighted = compute_weighted_floor(self.config, &request, self.params.existing_ratio)?;

        let mut row = ComparisonRow {
            speed,
            floor_existing: weighted.floor_existing,
            floor_new: weighted.floor_new,
            floor_weighted: weighted.floor_weighted,
            proposed_price: None,
            net_revenue: None,
            margin_baht: None,
            margin_percent: None,
            margin_valid: None,
        };

        if let Some(proposed) = self.params.proposed_prices.get(&speed) {
            let revenue = net_revenue(*proposed, self.params.discount_percent);
            let m = margin_against(&revenue, weighted.floor_weighted);
            row.proposed_price = Some(*proposed);
            row.net_revenue = Some(revenue.net_revenue);
            row.margin_baht = Some(m.margin_baht);
            row.margin_percent = Some(m.margin_percent);
            row.margin_valid = Some(m.is_valid);
        }

        Ok(row)
    }
}

/// Lazy iterator over comparison rows.
pub struct ComparisonRows<'a> {
    table: ComparisonTable<'a>,
    speeds: btree_map::Keys<'a, Mbps, Money>,
}

impl Iterator for ComparisonRows<'_> {
    type Item = FloorPriceResult<ComparisonRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let speed = *self.speeds.next()?;
        Some(self.table.row(speed))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.speeds.size_hint()
    }
}

impl<'a> IntoIterator for &ComparisonTable<'a> {
    type Item = FloorPriceResult<ComparisonRow>;
    type IntoIter = ComparisonRows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

/// Collected comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub segment: CustomerSegment,
    pub rows: Vec<ComparisonRow>,
}

/// Build the full comparison table in one go.
pub fn generate_comparison(
    config: &PricingConfig,
    params: &ComparisonParams,
) -> FloorPriceResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let table = ComparisonTable::new(config, params)?;
    let rows = table.rows().collect::<FloorPriceResult<Vec<_>>>()?;

    let catalog = config.speed_table(params.segment);
    for speed in params.proposed_prices.keys() {
        if !catalog.contains_key(speed) {
            warnings.push(format!(
                "Proposed price for {speed} Mbps ignored: not a catalog speed"
            ));
        }
    }
    for label in &params.equipment {
        if config.equipment_price(label).is_none() {
            warnings.push(format!("Unknown equipment '{label}' priced at zero"));
        }
    }

    let output = ComparisonOutput {
        segment: params.segment,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted floor comparison across catalog speeds",
        &serde_json::json!({
            "config": config.config_name,
            "segment": params.segment,
            "contract_months": params.contract_months,
            "existing_ratio": params.existing_ratio.to_string(),
            "discount_percent": params.discount_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ComparisonParams {
        ComparisonParams {
            segment: CustomerSegment::Residential,
            distance_km: dec!(1),
            equipment: vec![],
            contract_months: 24,
            has_fixed_ip: false,
            existing_ratio: dec!(0.7),
            discount_percent: Decimal::ZERO,
            proposed_prices: BTreeMap::new(),
        }
    }

    #[test]
    fn test_rows_cover_catalog_ascending() {
        let config = PricingConfig::default();
        let p = params();
        let table = ComparisonTable::new(&config, &p).unwrap();
        let speeds: Vec<Mbps> = table.rows().map(|r| r.unwrap().speed).collect();
        assert_eq!(speeds, vec![100, 300, 500, 1000, 2000]);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_rows_match_weighted_engine() {
        let config = PricingConfig::default();
        let p = params();
        let table = ComparisonTable::new(&config, &p).unwrap();
        let row = table.rows().nth(2).unwrap().unwrap();
        assert_eq!(row.speed, 500);
        assert_eq!(row.floor_existing, dec!(256.50));
        assert_eq!(row.floor_new, dec!(769.00));
        assert_eq!(row.floor_weighted, dec!(410.25));
        assert!(row.proposed_price.is_none());
    }

    #[test]
    fn test_restartable() {
        let config = PricingConfig::default();
        let p = params();
        let table = ComparisonTable::new(&config, &p).unwrap();
        let first: Vec<_> = (&table).into_iter().map(|r| r.unwrap()).collect();
        let second: Vec<_> = (&table).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_margin_columns_only_for_priced_speeds() {
        let config = PricingConfig::default();
        let mut p = params();
        p.proposed_prices.insert(500, dec!(599));
        let out = generate_comparison(&config, &p).unwrap();
        let rows = &out.result.rows;

        let priced = rows.iter().find(|r| r.speed == 500).unwrap();
        // 599 * 0.96 = 575.04 net against 410.25
        assert_eq!(priced.net_revenue, Some(dec!(575.04)));
        assert_eq!(priced.margin_baht, Some(dec!(164.79)));
        assert_eq!(priced.margin_valid, Some(true));

        assert!(rows.iter().filter(|r| r.speed != 500).all(|r| r.margin_valid.is_none()));
    }

    #[test]
    fn test_warns_on_non_catalog_proposed_speed() {
        let config = PricingConfig::default();
        let mut p = params();
        p.proposed_prices.insert(750, dec!(400));
        let out = generate_comparison(&config, &p).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.result.rows.iter().all(|r| r.proposed_price.is_none()));
    }

    #[test]
    fn test_zero_contract_rejected_up_front() {
        let config = PricingConfig::default();
        let mut p = params();
        p.contract_months = 0;
        assert!(ComparisonTable::new(&config, &p).is_err());
    }

    #[test]
    fn test_out_of_range_params_rejected_up_front() {
        let config = PricingConfig::default();

        let mut p = params();
        p.existing_ratio = dec!(1.5);
        assert!(matches!(
            ComparisonTable::new(&config, &p),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "existing_ratio"
        ));

        let mut p = params();
        p.discount_percent = dec!(-5);
        assert!(ComparisonTable::new(&config, &p).is_err());

        let mut p = params();
        p.distance_km = dec!(70000000000000000000000000000);
        assert!(matches!(
            generate_comparison(&config, &p),
            Err(FloorPriceError::InvalidInput { ref field, .. }) if field == "distance_km"
        ));

        let mut p = params();
        p.proposed_prices.insert(500, dec!(70000000000000000000000000000));
        assert!(generate_comparison(&config, &p).is_err());
    }
}
