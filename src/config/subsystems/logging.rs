// src/config/subsystems/logging.rs

use serde::{Serialize, Deserialize};
use log::LevelFilter;
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl FromIni for LoggingConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "logging" {
            return None;
        }

        match key {
            "level" => {
                self.level = value.trim_matches('"').to_lowercase();
                Some(Ok(()))
            },
            "log_to_file" => {
                match value.parse() {
                    Ok(flag) => {
                        self.log_to_file = flag;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid log_to_file value (must be true/false): {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        // Unknown levels fall back to Info in get_log_level
        Ok(())
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.level.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "none" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_filters() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.get_log_level(), LevelFilter::Info);
        config.level = "none".to_string();
        assert_eq!(config.get_log_level(), LevelFilter::Off);
        config.level = "TRACE".to_string();
        assert_eq!(config.get_log_level(), LevelFilter::Trace);
        config.level = "loud".to_string();
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }
}
