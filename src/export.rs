// src/export.rs
//
// Writes matched tables as pretty-printed JSON or as a single-sheet workbook.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use chrono::Local;
use log::info;
use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Xlsx,
    #[default]
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    /// "xlsx" (any case) selects a workbook; anything else is JSON.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("xlsx") {
            OutputFormat::Xlsx
        } else {
            OutputFormat::Json
        })
    }
}

/// `<dir>/matched_output_<YYYYMMDD_HHMMSS>.<ext>`, stamped with local time.
pub fn output_path(dir: &Path, format: OutputFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("matched_output_{}.{}", stamp, format.extension()))
}

pub fn write_table(table: &Table, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(table, path)?,
        OutputFormat::Xlsx => write_xlsx(table, path)?,
    }
    info!("Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}

/// JSON array of row objects, non-ASCII text written as is.
pub fn write_json(table: &Table, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &table.rows)?;
    writer.flush()?;
    Ok(())
}

/// Header row followed by one row per record. Null cells stay blank.
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string(0, column_index(col)?, name)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(i + 1)
            .map_err(|_| Error::Export(format!("row {} is beyond the sheet limit", i + 1)))?;
        for (col, name) in table.columns.iter().enumerate() {
            let col = column_index(col)?;
            match row.get(name) {
                None | Some(Value::Null) => {},
                Some(Value::String(s)) => {
                    sheet.write_string(row_num, col, s)?;
                },
                Some(Value::Number(n)) => {
                    if let Some(f) = n.as_f64() {
                        sheet.write_number(row_num, col, f)?;
                    }
                },
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(row_num, col, *b)?;
                },
                Some(other) => {
                    sheet.write_string(row_num, col, other.to_string())?;
                },
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| Error::Export(format!("column {} is beyond the sheet limit", col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ReadOptions, TabularReader};
    use serde_json::json;

    fn sample() -> Table {
        let rows = vec![
            json!({"search_query": "بنادول", "match_found": "بنادول", "match_score": 100.0, "price_retail": 12, "barcode_primary": null}),
            json!({"search_query": "zzz", "match_found": "No Match Found", "match_score": 0, "price_retail": null, "barcode_primary": null}),
        ];
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Table::from_rows(rows)
    }

    #[test]
    fn format_from_string() {
        assert_eq!("XLSX".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::default().extension(), "json");
    }

    #[test]
    fn output_name_is_timestamped() {
        let path = output_path(Path::new("/data/in"), OutputFormat::Xlsx);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("matched_output_"));
        assert!(name.ends_with(".xlsx"));
        // matched_output_ + YYYYMMDD_HHMMSS + .xlsx
        assert_eq!(name.len(), "matched_output_".len() + 15 + 5);
        assert_eq!(path.parent(), Some(Path::new("/data/in")));
    }

    #[test]
    fn json_export_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let table = sample();
        write_table(&table, &path, OutputFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("بنادول"));
        let back = TabularReader::default().read(&path, None, &ReadOptions::default()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn xlsx_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let table = sample();
        write_table(&table, &path, OutputFormat::Xlsx).unwrap();

        let back = TabularReader::default().read(&path, None, &ReadOptions::default()).unwrap();
        assert_eq!(back.columns, table.columns);
        assert_eq!(back.rows[0].get("match_found"), Some(&json!("بنادول")));
        assert_eq!(back.rows[0].get("match_score"), Some(&json!(100)));
        assert_eq!(back.rows[0].get("price_retail"), Some(&json!(12)));
        assert_eq!(back.rows[1].get("price_retail"), Some(&Value::Null));
    }
}
