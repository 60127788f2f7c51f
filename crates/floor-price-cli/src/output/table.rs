use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{body, row_cells, row_headers, warnings, Body};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let mut builder = Builder::default();
    match body(value) {
        Body::Rows(rows) if rows.is_empty() => {
            println!("(empty)");
            return;
        }
        Body::Rows(rows) => {
            let headers = row_headers(rows);
            builder.push_record(headers.iter().copied());
            for row in rows {
                builder.push_record(row_cells(row, &headers));
            }
        }
        Body::Fields(fields) => {
            builder.push_record(["Field", "Value"]);
            for (key, val) in fields {
                builder.push_record([key, val]);
            }
        }
    }
    println!("{}", Table::from(builder));

    let warnings = warnings(value);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {}", w);
        }
    }

    if let Some(meth) = value.get("methodology").and_then(Value::as_str) {
        println!("\nMethodology: {}", meth);
    }
}
