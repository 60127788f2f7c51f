use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FloorPriceError;

/// All monetary values (baht). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Catalog speed key in Mbps.
pub type Mbps = u32;

/// Decimal places for every externally visible money figure.
pub const MONEY_DP: u32 = 2;

/// Largest money figure a request or configuration may carry.
///
/// Together with the speed and distance limits this keeps every pipeline
/// product far inside `Decimal`'s range.
pub const MAX_AMOUNT: Money = dec!(1000000000000);

/// Fastest speed a request or catalog may name.
pub const MAX_SPEED_MBPS: Mbps = 1_000_000;

/// Longest installation distance accepted, in kilometers.
pub const MAX_DISTANCE_KM: Decimal = dec!(10000);

/// Round a money figure for disclosure.
pub fn round_money(value: Decimal) -> Money {
    value.round_dp(MONEY_DP)
}

/// Customer segment. Every price table is keyed by segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerSegment {
    #[default]
    Residential,
    Business,
}

impl CustomerSegment {
    pub const ALL: [CustomerSegment; 2] = [CustomerSegment::Residential, CustomerSegment::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerSegment::Residential => "residential",
            CustomerSegment::Business => "business",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerSegment {
    type Err = FloorPriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "residential" | "home" => Ok(CustomerSegment::Residential),
            "business" => Ok(CustomerSegment::Business),
            other => Err(FloorPriceError::InvalidInput {
                field: "segment".into(),
                reason: format!("Unknown customer segment '{other}' (expected residential or business)"),
            }),
        }
    }
}

/// A value held once per customer segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BySegment<T> {
    pub residential: T,
    pub business: T,
}

impl<T> BySegment<T> {
    pub fn new(residential: T, business: T) -> Self {
        Self {
            residential,
            business,
        }
    }

    pub fn get(&self, segment: CustomerSegment) -> &T {
        match segment {
            CustomerSegment::Residential => &self.residential,
            CustomerSegment::Business => &self.business,
        }
    }

    pub fn get_mut(&mut self, segment: CustomerSegment) -> &mut T {
        match segment {
            CustomerSegment::Residential => &mut self.residential,
            CustomerSegment::Business => &mut self.business,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CustomerSegment, &T)> {
        CustomerSegment::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
