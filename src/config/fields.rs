// src/config/fields.rs
//
// Optional display-label sidecar for reference database fields:
// { "fields": [ { "key": "price_retail", "label": "Retail price" }, ... ] }

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLabel {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldLabel {
    /// The label if one is set, otherwise the key itself.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldLabels {
    #[serde(default)]
    pub fields: Vec<FieldLabel>,
}

impl FieldLabels {
    /// Reads the sidecar. Absence or a malformed document yields an empty list.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No field label file at {:?}", path);
            return Self::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<FieldLabels>(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(labels) => {
                debug!("Loaded {} field labels from {:?}", labels.fields.len(), path);
                labels
            },
            Err(e) => {
                warn!("Ignoring field label file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.key.clone()).collect()
    }

    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(FieldLabel::display)
            .unwrap_or(key)
    }

    /// Field keys to offer for display: the sidecar's keys, or the
    /// reference database's own columns when the sidecar is empty.
    pub fn display_keys(&self, database_columns: &[String]) -> Vec<String> {
        if self.is_empty() {
            database_columns.to_vec()
        } else {
            self.keys()
        }
    }
}
