// src/config/subsystems/reader.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;
use crate::reader::delimited::CandidateEncoding;

/// Bounds for the delimited-text attempt plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Highest number of leading junk lines tried before the header row
    pub max_skip_rows: usize,
    /// Rows parsed per trial attempt
    pub trial_rows: usize,
    /// Encoding labels in order of preference
    pub encodings: Vec<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_skip_rows: 50,
            trial_rows: 10,
            encodings: CandidateEncoding::ALL
                .iter()
                .map(|e| e.label().to_string())
                .collect(),
        }
    }
}

impl FromIni for ReaderConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "reader" {
            return None;
        }

        match key {
            "max_skip_rows" => {
                match value.parse() {
                    Ok(rows) => {
                        self.max_skip_rows = rows;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid max_skip_rows: {}", value)
                    ))),
                }
            },
            "trial_rows" => {
                match value.parse() {
                    Ok(rows) => {
                        self.trial_rows = rows;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid trial_rows: {}", value)
                    ))),
                }
            },
            "encodings" => {
                self.encodings = value
                    .trim_matches('"')
                    .split(',')
                    .map(|label| label.trim().to_string())
                    .filter(|label| !label.is_empty())
                    .collect();
                Some(Ok(()))
            },
            _ => None,
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trial_rows == 0 {
            return Err(Error::Config("trial_rows must be greater than 0".to_string()));
        }
        if let Some(label) = self.encodings.iter().find(|l| CandidateEncoding::from_label(l).is_none()) {
            return Err(Error::Config(format!("Unknown encoding in [reader] encodings: {}", label)));
        }
        Ok(())
    }
}
