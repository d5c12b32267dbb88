use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};

/// One row of tabular data: field name to JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// Ordered columns plus ordered rows. Produced by the tabular reader and the
/// matching pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table whose columns are the union of the row keys in order of
    /// first appearance. Every row is padded with null for columns it lacks.
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let columns = collect_columns(&rows);
        Self::with_columns(columns, rows)
    }

    /// Builds a table with the given columns, padding each row with null for
    /// the columns it lacks. Keys outside `columns` are dropped.
    pub fn with_columns(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| pad_row(row, &columns))
            .collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trims whitespace around every column name, in the header and in the rows.
    pub fn trim_columns(&mut self) {
        if self.columns.iter().all(|c| c.trim() == c) {
            return;
        }
        for column in self.columns.iter_mut() {
            *column = column.trim().to_string();
        }
        for row in self.rows.iter_mut() {
            let trimmed: Record = std::mem::take(row)
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v))
                .collect();
            *row = trimmed;
        }
    }
}

/// Column names across `rows`, deduplicated, in order of first appearance.
pub fn collect_columns(rows: &[Record]) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn pad_row(row: Record, columns: &[String]) -> Record {
    if row.len() == columns.len() && row.keys().zip(columns).all(|(k, c)| k == c) {
        return row;
    }
    let mut padded = Record::with_capacity(columns.len());
    for column in columns {
        let value = row.get(column).cloned().unwrap_or(Value::Null);
        padded.insert(column.clone(), value);
    }
    padded
}

/// Renders a cell value as plain text. Null (and NaN-like floats that could
/// not be stored as JSON numbers) become the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Looks up `field` in `row` without failing on absent names.
pub fn field_text(row: &Record, field: &str) -> String {
    row.get(field).map(value_text).unwrap_or_default()
}
