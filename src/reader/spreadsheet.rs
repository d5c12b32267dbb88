// reader/spreadsheet.rs

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use serde_json::{Number, Value};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Record, Table};
use super::{unique_headers, SheetSelector};

/// Worksheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Reads one worksheet: the first row is the header, the rest are data rows.
pub fn read_sheet(path: &Path, sheet: Option<&SheetSelector>, row_limit: Option<usize>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        None => names.first().cloned(),
        Some(SheetSelector::Index(i)) => names.get(*i).cloned(),
        Some(SheetSelector::Name(wanted)) => names
            .iter()
            .find(|n| n.trim() == wanted.trim())
            .cloned(),
    }
    .ok_or_else(|| Error::malformed(format!(
        "sheet {:?} not found in {:?} (available: {})",
        sheet,
        path,
        names.join(", ")
    )))?;

    debug!("Reading sheet '{}' of {:?}", name, path);
    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();

    let columns = match rows.next() {
        Some(header) => unique_headers(header.iter().map(header_text)),
        None => return Ok(Table::default()),
    };

    let mut records = Vec::new();
    for row in rows {
        if row_limit.map_or(false, |limit| records.len() >= limit) {
            break;
        }
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let mut record = Record::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let value = row.get(i).map(cell_value).unwrap_or(Value::Null);
            record.insert(column.clone(), value);
        }
        records.push(record);
    }

    Ok(Table::new(columns, records))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Converts a cell to JSON. Whole-number floats become integers, the way
/// spreadsheet applications display them.
pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

fn float_value(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}
