use serde_json::Value;
use std::io;

use super::{body, row_cells, row_headers, Body};

/// Write output as CSV to stdout. Comparison rows get one line per speed,
/// anything else a `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match body(value) {
        Body::Rows(rows) => {
            let headers = row_headers(rows);
            let mut res = wtr.write_record(&headers);
            for row in rows {
                if res.is_err() {
                    break;
                }
                res = wtr.write_record(row_cells(row, &headers));
            }
            res
        }
        Body::Fields(fields) => {
            let mut res = wtr.write_record(["field", "value"]);
            for (key, val) in &fields {
                if res.is_err() {
                    break;
                }
                res = wtr.write_record([key, val]);
            }
            res
        }
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}
