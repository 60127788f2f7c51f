use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::FloorPriceError;
use crate::types::{CustomerSegment, Mbps, Money, Rate};
use crate::FloorPriceResult;

/// Above the catalog with two or more points: the extrapolated increase is
/// capped at this fraction of the highest catalog price.
pub const MAX_EXTRAPOLATED_INCREASE: Rate = dec!(0.5);

/// Above a single-point catalog: the speed ratio applied to the only price
/// is capped at this multiple.
pub const MAX_EXTRAPOLATION_RATIO: Decimal = dec!(1.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationDirection {
    Upward,
    Downward,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedPoint {
    pub speed: Mbps,
    pub price: Money,
}

/// How the base price for a requested speed was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationInfo {
    /// False only for an exact catalog hit
    pub interpolated: bool,
    /// Lower bracketing point; for upward extrapolation, the highest catalog point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<SpeedPoint>,
    /// Upper bracketing point; for downward extrapolation, the lowest catalog point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<SpeedPoint>,
    /// Position between the bracketing points, or requested / reference speed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrapolation: Option<ExtrapolationDirection>,
    /// True when the extrapolation cap was applied
    pub capped: bool,
}

impl InterpolationInfo {
    fn exact() -> Self {
        Self {
            interpolated: false,
            lower: None,
            upper: None,
            ratio: None,
            extrapolation: None,
            capped: false,
        }
    }
}

/// Unrounded base price plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedQuote {
    pub price: Decimal,
    pub info: InterpolationInfo,
}

/// Price a requested speed against a segment's catalog.
///
/// Exact hits use the catalog price. Speeds between two catalog entries are
/// linearly interpolated. Speeds below the catalog take the lowest price;
/// speeds above it are extrapolated and capped (see the two cap constants).
pub fn quote_speed(
    table: &BTreeMap<Mbps, Money>,
    segment: CustomerSegment,
    speed: Decimal,
) -> FloorPriceResult<SpeedQuote> {
    if table.is_empty() {
        return Err(FloorPriceError::Configuration(format!(
            "No speed prices configured for {segment} customers"
        )));
    }

    if speed.fract().is_zero() {
        if let Some(price) = speed.to_u32().and_then(|s| table.get(&s)) {
            return Ok(SpeedQuote {
                price: *price,
                info: InterpolationInfo::exact(),
            });
        }
    }

    let lower = table
        .iter()
        .rev()
        .find(|(s, _)| Decimal::from(**s) < speed)
        .map(|(s, p)| SpeedPoint { speed: *s, price: *p });
    let upper = table
        .iter()
        .find(|(s, _)| Decimal::from(**s) > speed)
        .map(|(s, p)| SpeedPoint { speed: *s, price: *p });

    let quote = match (lower, upper) {
        (Some(lo), Some(hi)) => interpolate(lo, hi, speed),
        (Some(_), None) => extrapolate_upward(table, speed),
        (None, Some(hi)) => SpeedQuote {
            price: hi.price,
            info: InterpolationInfo {
                interpolated: true,
                lower: None,
                upper: Some(hi),
                ratio: None,
                extrapolation: Some(ExtrapolationDirection::Downward),
                capped: false,
            },
        },
        // Non-empty table and no exact hit always yields a neighbour.
        (None, None) => {
            return Err(FloorPriceError::Configuration(format!(
                "Speed table for {segment} customers has no usable entries"
            )))
        }
    };

    debug!(
        %segment,
        %speed,
        price = %quote.price,
        extrapolation = ?quote.info.extrapolation,
        capped = quote.info.capped,
        "priced non-catalog speed"
    );
    Ok(quote)
}

fn interpolate(lo: SpeedPoint, hi: SpeedPoint, speed: Decimal) -> SpeedQuote {
    let span = Decimal::from(hi.speed) - Decimal::from(lo.speed);
    let ratio = (speed - Decimal::from(lo.speed)) / span;
    let price = lo.price + ratio * (hi.price - lo.price);
    SpeedQuote {
        price,
        info: InterpolationInfo {
            interpolated: true,
            lower: Some(lo),
            upper: Some(hi),
            ratio: Some(ratio),
            extrapolation: None,
            capped: false,
        },
    }
}

fn extrapolate_upward(table: &BTreeMap<Mbps, Money>, speed: Decimal) -> SpeedQuote {
    let mut top = table
        .iter()
        .rev()
        .map(|(s, p)| SpeedPoint { speed: *s, price: *p });
    // Caller guarantees at least one entry below `speed`.
    let highest = top.next().unwrap_or(SpeedPoint {
        speed: 0,
        price: Decimal::ZERO,
    });
    let ratio = if highest.speed == 0 {
        Decimal::ZERO
    } else {
        speed / Decimal::from(highest.speed)
    };

    let (price, capped) = match top.next() {
        Some(second) => {
            let slope = (highest.price - second.price)
                / (Decimal::from(highest.speed) - Decimal::from(second.speed));
            let increase = slope * (speed - Decimal::from(highest.speed));
            let cap = highest.price * MAX_EXTRAPOLATED_INCREASE;
            if increase > cap {
                (highest.price + cap, true)
            } else {
                // Falling top segment: held at the top price, beyond the slope formula.
                (highest.price + increase.max(Decimal::ZERO), false)
            }
        }
        None => {
            if ratio > MAX_EXTRAPOLATION_RATIO {
                (highest.price * MAX_EXTRAPOLATION_RATIO, true)
            } else {
                (highest.price * ratio, false)
            }
        }
    };

    SpeedQuote {
        price,
        info: InterpolationInfo {
            interpolated: true,
            lower: Some(highest),
            upper: None,
            ratio: Some(ratio),
            extrapolation: Some(ExtrapolationDirection::Upward),
            capped,
        },
    }
}
