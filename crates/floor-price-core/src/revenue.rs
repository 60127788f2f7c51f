use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::invalid_input;
use crate::types::{round_money, Money, Rate, MAX_AMOUNT};
use crate::FloorPriceResult;

/// Regulator fee charged on the post-discount price.
pub const REGULATOR_FEE_RATE: Rate = dec!(0.04);

const HUNDRED: Decimal = dec!(100);

/// Proposed price after discount and regulator fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetRevenue {
    pub proposed_price: Money,
    pub discount_percent: Decimal,
    pub discount_amount: Money,
    pub price_after_discount: Money,
    pub regulator_fee: Money,
    pub net_revenue: Money,
}

/// Margin of net revenue over a floor price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginResult {
    pub floor_price: Money,
    pub net_revenue: Money,
    /// net_revenue - floor_price
    pub margin_baht: Money,
    /// margin_baht as a percentage of net revenue
    pub margin_percent: Decimal,
    /// net_revenue >= floor_price
    pub is_valid: bool,
}

/// Money figure within `[0, MAX_AMOUNT]`.
pub fn validate_amount(field: &str, value: Money) -> FloorPriceResult<()> {
    if value < Decimal::ZERO || value > MAX_AMOUNT {
        return Err(invalid_input(
            field,
            format!("Amount must be between 0 and {MAX_AMOUNT}, got {value}"),
        ));
    }
    Ok(())
}

/// Range check for a proposed price and its sales discount.
pub fn validate_proposal(proposed_price: Money, discount_percent: Decimal) -> FloorPriceResult<()> {
    validate_amount("proposed_price", proposed_price)?;
    if discount_percent < Decimal::ZERO || discount_percent > HUNDRED {
        return Err(invalid_input(
            "discount_percent",
            "Discount must be between 0 and 100",
        ));
    }
    Ok(())
}

/// Unrounded discount, post-discount price and fee.
fn revenue_parts(proposed_price: Money, discount_percent: Decimal) -> (Money, Money, Money) {
    let discount_amount = proposed_price * discount_percent / HUNDRED;
    let price_after_discount = proposed_price - discount_amount;
    let regulator_fee = price_after_discount * REGULATOR_FEE_RATE;
    (discount_amount, price_after_discount, regulator_fee)
}

fn exact_net(proposed_price: Money, discount_percent: Decimal) -> Money {
    let (_, after, fee) = revenue_parts(proposed_price, discount_percent);
    after - fee
}

/// Apply the sales discount, then the regulator fee on what remains.
///
/// The fee is taken after the discount; swapping the order changes the result.
/// Inputs are expected to pass [`validate_proposal`].
pub fn net_revenue(proposed_price: Money, discount_percent: Decimal) -> NetRevenue {
    let (discount_amount, price_after_discount, regulator_fee) =
        revenue_parts(proposed_price, discount_percent);

    NetRevenue {
        proposed_price,
        discount_percent,
        discount_amount: round_money(discount_amount),
        price_after_discount: round_money(price_after_discount),
        regulator_fee: round_money(regulator_fee),
        net_revenue: round_money(price_after_discount - regulator_fee),
    }
}

/// Compare a floor against the net revenue of a proposed price.
///
/// Both amounts are expected to pass [`validate_amount`].
pub fn margin(proposed_price: Money, floor_price: Money, discount_percent: Decimal) -> MarginResult {
    let revenue = net_revenue(proposed_price, discount_percent);
    margin_against(&revenue, floor_price)
}

/// Margin for an already computed net revenue, so several floors can share one.
///
/// Validity is judged on the unrounded net; only the reported figures are rounded.
pub fn margin_against(revenue: &NetRevenue, floor_price: Money) -> MarginResult {
    let exact = exact_net(revenue.proposed_price, revenue.discount_percent);
    let margin_baht = exact - floor_price;
    // Denominated over revenue, not over the floor
    let margin_percent = if revenue.net_revenue > Decimal::ZERO {
        round_money(margin_baht / exact * HUNDRED)
    } else {
        Decimal::ZERO
    };

    MarginResult {
        floor_price,
        net_revenue: revenue.net_revenue,
        margin_baht: round_money(margin_baht),
        margin_percent,
        is_valid: exact >= floor_price,
    }
}

/// Legacy margin: markup of the proposed price over the floor, in percent.
///
/// Ignores discount and regulator fee, and divides by the floor. Returns 0
/// for a floor that rounds to zero.
pub fn simple_margin(proposed_price: Money, floor_price: Money) -> Decimal {
    if round_money(floor_price).is_zero() {
        return Decimal::ZERO;
    }
    round_money((proposed_price - floor_price) / floor_price * HUNDRED)
}
