// storage/reference.rs
//
// One immutable snapshot of the reference drug database plus the
// normalized bilingual name indexes built from it.

use std::fs;
use std::path::Path;
use serde_json::Value;
use log::debug;

use crate::error::{Error, Result};
use crate::parser::{DrugNameParser, NameLanguage, TextParser};
use crate::reader::json;
use crate::types::{collect_columns, value_text, Record};

#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    records: Vec<Record>,
    keys_en: Vec<String>,
    keys_ar: Vec<String>,
    columns: Vec<String>,
}

impl ReferenceSet {
    /// Builds the name indexes for `records`. Records lacking `name_en` or
    /// `name_ar` get an empty string for it.
    pub fn build(mut records: Vec<Record>, parser: &DrugNameParser) -> Self {
        for record in records.iter_mut() {
            for field in [NameLanguage::English.name_field(), NameLanguage::Arabic.name_field()] {
                if !record.contains_key(field) {
                    record.insert(field.to_string(), Value::String(String::new()));
                }
            }
        }
        let (keys_en, keys_ar, _) = build_keys(&records, parser);
        let columns = collect_columns(&records);
        Self { records, keys_en, keys_ar, columns }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: usize) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn keys_en(&self) -> &[String] {
        &self.keys_en
    }

    pub fn keys_ar(&self) -> &[String] {
        &self.keys_ar
    }

    /// Normalized name index for one language, aligned with `records()`.
    pub fn keys(&self, language: NameLanguage) -> &[String] {
        match language {
            NameLanguage::English => &self.keys_en,
            NameLanguage::Arabic => &self.keys_ar,
        }
    }

    /// Every field name seen across the records, in order of first appearance.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Normalizes each record's English and Arabic name. The three returned
/// sequences are index-aligned with `records`.
pub fn build_keys(records: &[Record], parser: &DrugNameParser) -> (Vec<String>, Vec<String>, Vec<usize>) {
    let mut keys_en = Vec::with_capacity(records.len());
    let mut keys_ar = Vec::with_capacity(records.len());
    let mut ids = Vec::with_capacity(records.len());

    for (id, record) in records.iter().enumerate() {
        keys_en.push(name_key(record, NameLanguage::English, parser));
        keys_ar.push(name_key(record, NameLanguage::Arabic, parser));
        ids.push(id);
    }
    (keys_en, keys_ar, ids)
}

fn name_key(record: &Record, language: NameLanguage, parser: &DrugNameParser) -> String {
    let name = record
        .get(language.name_field())
        .map(value_text)
        .unwrap_or_default();
    parser.normalize(&name)
}

/// Reads and validates the reference database document.
pub fn load_reference_file(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }
    let records = json::records_from_document(json::parse_document(&bytes)?)
        .map_err(|e| Error::malformed(format!("{:?}: {}", path, e)))?;
    if records.is_empty() {
        return Err(Error::malformed(format!("{:?}: database holds no records", path)));
    }
    debug!("Parsed {} reference records from {:?}", records.len(), path);
    Ok(records)
}
