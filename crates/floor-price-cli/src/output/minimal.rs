use serde_json::Value;

use super::{body, Body};

/// Fields that answer the question a command was asked, most decisive first.
const PRIORITY_KEYS: [&str; 9] = [
    "is_valid_weighted",
    "is_valid",
    "floor_weighted",
    "floor_price",
    "net_revenue",
    "margin_percent",
    "total_cost",
    "valid",
    "version",
];

/// Print just the key answer: the verdict or headline figure, or
/// `speed: floor_weighted` per line for a comparison.
pub fn print_minimal(value: &Value) {
    match body(value) {
        Body::Rows(rows) => {
            for row in rows {
                if let (Some(speed), Some(floor)) = (row.get("speed"), row.get("floor_weighted")) {
                    println!("{}: {}", super::cell(speed), super::cell(floor));
                }
            }
        }
        Body::Fields(fields) => {
            let hit = PRIORITY_KEYS
                .iter()
                .find_map(|key| fields.iter().find(|(k, v)| k == key && !v.is_empty()));
            match hit.or_else(|| fields.first()) {
                Some((key, val)) if hit.is_none() => println!("{}: {}", key, val),
                Some((_, val)) => println!("{}", val),
                None => {}
            }
        }
    }
}
