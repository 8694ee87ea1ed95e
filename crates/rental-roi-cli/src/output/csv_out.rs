use serde_json::Value;
use std::io;

use super::{cell, flatten};

/// Write output as CSV to stdout.
///
/// Envelopes become two-column `field,value` rows (nested fields dotted);
/// arrays become one record per item under a shared header.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => match map.get("result").unwrap_or(value) {
            Value::Array(rows) => write_array_csv(&mut wtr, rows),
            body => write_field_csv(&mut wtr, body),
        },
        _ => wtr.write_record([cell(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "CSV output failed");
    }
}

fn write_field_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten(value) {
        wtr.write_record([key, cell(&val)])?;
    }
    Ok(())
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(first) = arr.first() else {
        return Ok(());
    };

    if !first.is_object() {
        for item in arr {
            wtr.write_record([cell(item)])?;
        }
        return Ok(());
    }

    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;

    for item in arr {
        let row = flatten(item);
        let record: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| cell(v))
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}
