// reader/mod.rs
//
// Defensive reading of user-supplied tables: spreadsheets, JSON record
// arrays, and delimited text of unknown encoding and delimiter.

pub mod delimited;
pub mod json;
pub mod spreadsheet;

use std::fs;
use std::path::Path;
use std::str::FromStr;
use ahash::AHashMap;
use log::{debug, warn};

use crate::config::subsystems::ReaderConfig;
use crate::error::{Error, Result};
use crate::types::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Json,
    Delimited,
}

impl InputFormat {
    /// Guess the format from the file extension; unknown extensions are
    /// treated as delimited text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => InputFormat::Spreadsheet,
            "json" => InputFormat::Json,
            _ => InputFormat::Delimited,
        }
    }
}

/// Selects a worksheet by zero-based position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Maximum number of data rows; `Some(0)` reads the header only.
    pub row_limit: Option<usize>,
    pub sheet: Option<SheetSelector>,
}

impl ReadOptions {
    pub fn header_only() -> Self {
        Self { row_limit: Some(0), sheet: None }
    }

    pub fn with_sheet(sheet: Option<SheetSelector>) -> Self {
        Self { row_limit: None, sheet }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabularReader {
    config: ReaderConfig,
}

impl TabularReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn read<P: AsRef<Path>>(
        &self,
        path: P,
        format_hint: Option<InputFormat>,
        options: &ReadOptions,
    ) -> Result<Table> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let format = format_hint.unwrap_or_else(|| InputFormat::from_path(path));
        debug!("Reading {:?} as {:?} (row limit {:?})", path, format, options.row_limit);

        let mut table = match format {
            InputFormat::Spreadsheet => {
                spreadsheet::read_sheet(path, options.sheet.as_ref(), options.row_limit)?
            },
            InputFormat::Json => {
                let bytes = fs::read(path)?;
                json::read_bytes(&bytes, options.row_limit)?
            },
            InputFormat::Delimited => {
                let bytes = fs::read(path)?;
                if bytes.is_empty() {
                    return Err(Error::EmptyFile(path.to_path_buf()));
                }
                delimited::read_bytes(&bytes, &self.config, options.row_limit)
                    .map_err(|reason| Error::unreadable(path, reason))?
            },
        };
        table.trim_columns();
        Ok(table)
    }

    /// Column names of the file, whitespace-trimmed.
    pub fn headers<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        Ok(self.read(path, None, &ReadOptions::header_only())?.columns)
    }

    /// Column names of one worksheet of a spreadsheet.
    pub fn sheet_headers<P: AsRef<Path>>(&self, path: P, sheet: Option<SheetSelector>) -> Result<Vec<String>> {
        let options = ReadOptions { row_limit: Some(0), sheet };
        Ok(self.read(path, None, &options)?.columns)
    }

    /// Worksheet names in workbook order; empty on any failure.
    pub fn sheet_names<P: AsRef<Path>>(&self, path: P) -> Vec<String> {
        let path = path.as_ref();
        if InputFormat::from_path(path) != InputFormat::Spreadsheet {
            return Vec::new();
        }
        match spreadsheet::sheet_names(path) {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list sheets of {:?}: {}", path, e);
                Vec::new()
            }
        }
    }
}

/// Trims header cells, names blank ones `Unnamed: <i>` and suffixes
/// duplicates with `.1`, `.2`, ...
pub(crate) fn unique_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: AHashMap<String, usize> = AHashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            let base = if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            unique
        })
        .collect()
}
