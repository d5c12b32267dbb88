// reader/json.rs
//
// JSON documents holding records: either a bare array of objects or an
// object with a `data` array of objects.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{collect_columns, Record, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses raw bytes as a JSON document, tolerating a UTF-8 byte-order mark.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    serde_json::from_slice(bytes)
        .map_err(|e| Error::malformed(format!("invalid JSON: {}", e)))
}

/// Extracts the record array from a parsed document.
pub fn records_from_document(document: Value) -> Result<Vec<Record>> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Error::malformed("'data' is not an array")),
            None => return Err(Error::malformed("object has no 'data' array")),
        },
        other => {
            return Err(Error::malformed(format!(
                "expected an array of records or an object with a 'data' array, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(Error::malformed(format!(
                "record {} is {}, expected an object",
                i,
                json_kind(&other)
            ))),
        })
        .collect()
}

pub fn read_bytes(bytes: &[u8], row_limit: Option<usize>) -> Result<Table> {
    let mut records = records_from_document(parse_document(bytes)?)?;
    // Columns come from every record so a header preview is complete
    let columns = collect_columns(&records);
    if let Some(limit) = row_limit {
        records.truncate(limit);
    }
    Ok(Table::with_columns(columns, records))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
