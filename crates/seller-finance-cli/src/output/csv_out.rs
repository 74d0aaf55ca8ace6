use serde_json::{Map, Value};
use std::io;

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Scalar results become `field,value` pairs. Row lists become one table
/// with a leading `section` column, so both schedules of a deal land in a
/// single spreadsheet-ready block.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let written = match body {
        Value::Object(map) if map.values().any(is_row_list) => write_sections(&mut wtr, map),
        Value::Object(map) => write_pairs(&mut wtr, map),
        Value::Array(rows) => write_rows(&mut wtr, None, rows, true),
        other => wtr.write_record([format_csv_value(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_pairs(wtr: &mut StdoutCsv<'_>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &format_csv_value(val)])?;
    }
    Ok(())
}

fn write_sections(wtr: &mut StdoutCsv<'_>, map: &Map<String, Value>) -> csv::Result<()> {
    let mut header_written = false;
    for (section, val) in map {
        if let Value::Array(rows) = val {
            if !rows.is_empty() {
                write_rows(wtr, Some(section), rows, !header_written)?;
                header_written = true;
            }
        }
    }
    // Structural notes that carry no rows
    for (section, val) in map {
        if let Value::String(note) = val {
            eprintln!("{}: {}", section, note);
        }
    }
    Ok(())
}

fn write_rows(
    wtr: &mut StdoutCsv<'_>,
    section: Option<&str>,
    rows: &[Value],
    with_header: bool,
) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_csv_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    if with_header {
        let mut record: Vec<&str> = Vec::with_capacity(headers.len() + 1);
        if section.is_some() {
            record.push("section");
        }
        record.extend(&headers);
        wtr.write_record(&record)?;
    }

    for item in rows {
        if let Value::Object(map) = item {
            let mut record: Vec<String> = section.iter().map(|s| s.to_string()).collect();
            record.extend(
                headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

fn is_row_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().is_some_and(Value::is_object))
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
