// src/config/file.rs

use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use crate::error::Result;
use super::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub database_path: PathBuf,
    pub field_labels_path: PathBuf,
    pub stop_words_file: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("druglist.json"),
            field_labels_path: PathBuf::from("config.json"),
            stop_words_file: None,
        }
    }
}

impl FromIni for FileConfig {
    fn from_ini_section(&mut self, _section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        match key {
            "database_path" => {
                self.database_path = PathBuf::from(value.trim_matches('"'));
                Some(Ok(()))
            },
            "field_labels_path" => {
                self.field_labels_path = PathBuf::from(value.trim_matches('"'));
                Some(Ok(()))
            },
            "stop_words_file" => {
                let value = value.trim_matches('"');
                self.stop_words_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
                Some(Ok(()))
            },
            _ => None,
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        // The database itself is checked when the reference store loads it
        if self.database_path.as_os_str().is_empty() {
            return Err(crate::error::Error::Config(
                "database_path must not be empty".to_string()
            ));
        }
        Ok(())
    }
}
