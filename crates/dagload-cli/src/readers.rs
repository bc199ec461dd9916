//! Input readers
//!
//! Each reader produces a [`Table`]: raw headers plus rows of optional
//! strings. Empty cells become `None`.

use crate::error::Result;
use calamine::{open_workbook_auto, Data, Reader};
use dagload_common::LoadError;
use dagload_core::{Cell, Table};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read delimited text with a header row
///
/// Short rows are padded with empty cells; a row wider than the header is a
/// parse error.
pub fn read_csv<R: Read>(reader: R, source_name: &str) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let expected = headers.len();
    let mut table = Table::new(headers);
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() > expected {
            return Err(LoadError::parse(
                source_name,
                format!("row {} has {} fields, expected {}", i + 1, record.len(), expected),
            )
            .into());
        }
        table.push_row(record.iter().map(|v| Some(v.to_string())).collect());
    }
    Ok(table)
}

/// Read a JSON array of records
///
/// Columns are the union of all record keys in first-seen order.
pub fn read_json<R: Read>(reader: R, source_name: &str) -> Result<Table> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(LoadError::parse(source_name, "expected an array of records").into());
    };

    let mut records = Vec::with_capacity(items.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(record) = item else {
            return Err(LoadError::parse(source_name, format!("item {i} is not an object")).into());
        };
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        records.push(record);
    }

    let mut table = Table::new(headers);
    for mut record in records {
        let row = table
            .headers
            .iter()
            .map(|h| record.remove(h).and_then(json_cell))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_cell(value: Value) -> Cell {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(bool_text(b)),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn bool_text(b: bool) -> String {
    if b { "True" } else { "False" }.to_string()
}

/// Read every sheet of a spreadsheet as `(sheet name, table)`
///
/// The first row of each sheet holds the headers. Empty sheets are left out.
pub fn read_workbook(path: &Path) -> Result<Vec<(String, Table)>> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            debug!(sheet = %name, "Skipping empty sheet");
            continue;
        };

        let mut table = Table::new(
            header_row
                .iter()
                .map(|c| sheet_cell(c).unwrap_or_default().trim().to_string())
                .collect(),
        );
        for row in rows {
            table.push_row(row.iter().map(sheet_cell).collect());
        }
        sheets.push((name, table));
    }
    Ok(sheets)
}

fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(float_text(*f)),
        Data::Bool(b) => Some(bool_text(*b)),
        Data::DateTime(dt) => Some(float_text(dt.as_f64())),
        Data::Error(e) => Some(e.to_string()),
    }
}

/// Integral floats (spreadsheets store all numbers as floats) lose the `.0`
fn float_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
