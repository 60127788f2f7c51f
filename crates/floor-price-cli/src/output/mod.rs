pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// What a command produced, with the envelope peeled off.
pub enum Body<'a> {
    /// One row per catalog speed
    Rows(&'a [Value]),
    /// A single result as `(dotted.key, text)` pairs
    Fields(Vec<(String, String)>),
}

/// Unwrap `result` (and a price check's `record`), then flatten.
pub fn body(value: &Value) -> Body<'_> {
    let mut result = value.get("result").unwrap_or(value);
    if let Some(record) = result.get("record") {
        result = record;
    }
    match result {
        Value::Array(rows) => Body::Rows(rows.as_slice()),
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(rows)) => Body::Rows(rows.as_slice()),
            _ => {
                let mut fields = Vec::new();
                flatten_into("", map, &mut fields);
                Body::Fields(fields)
            }
        },
        other => Body::Fields(vec![("value".to_string(), cell(other))]),
    }
}

/// Nested breakdowns become `installation.total_cost`, `interpolation.ratio`, ...
fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            _ => out.push((name, cell(val))),
        }
    }
}

/// Column headers for a set of rows; later rows may add margin columns.
pub fn row_headers(rows: &[Value]) -> Vec<&str> {
    let mut headers: Vec<&str> = Vec::new();
    for key in rows.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
        if !headers.contains(&key.as_str()) {
            headers.push(key.as_str());
        }
    }
    headers
}

pub fn row_cells(row: &Value, headers: &[&str]) -> Vec<String> {
    headers
        .iter()
        .map(|h| row.get(*h).map(cell).unwrap_or_default())
        .collect()
}

/// Text for one cell. Arrays of labels are joined; nulls are blank.
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Envelope warnings, if the command produced any.
pub fn warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|w| w.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breakdown_flattens_with_dotted_keys() {
        let v = json!({"floor_price": "256.50", "installation": {"total_cost": "12300"}});
        let Body::Fields(fields) = body(&v) else {
            panic!("expected fields");
        };
        assert!(fields.contains(&("installation.total_cost".to_string(), "12300".to_string())));
        assert!(fields.contains(&("floor_price".to_string(), "256.50".to_string())));
    }

    #[test]
    fn test_price_check_uses_record() {
        let v = json!({"result": {"record": {"is_valid_weighted": true}, "floors": {}}});
        let Body::Fields(fields) = body(&v) else {
            panic!("expected fields");
        };
        assert_eq!(fields, vec![("is_valid_weighted".to_string(), "true".to_string())]);
    }

    #[test]
    fn test_comparison_rows_and_union_headers() {
        let v = json!({"result": {"segment": "residential", "rows": [
            {"speed": 100, "floor_weighted": "300"},
            {"speed": 500, "floor_weighted": "410.25", "margin_valid": true}
        ]}});
        let Body::Rows(rows) = body(&v) else {
            panic!("expected rows");
        };
        let headers = row_headers(rows);
        assert_eq!(headers, vec!["floor_weighted", "speed", "margin_valid"]);
        assert_eq!(row_cells(&rows[0], &headers), vec!["300", "100", ""]);
    }
}
