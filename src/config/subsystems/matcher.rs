// src/config/subsystems/matcher.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    // Batch matching: normalized query first, raw query second
    pub batch_cutoff: f64,
    pub fallback_cutoff: f64,

    // Live search
    pub live_cutoff: f64,
    pub live_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            batch_cutoff: 55.0,
            fallback_cutoff: 40.0,
            live_cutoff: 50.0,
            live_limit: 50,
        }
    }
}

fn parse_cutoff(key: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(cutoff) if (0.0..=100.0).contains(&cutoff) => Ok(cutoff),
        _ => Err(Error::Config(
            format!("Invalid {} (must be between 0 and 100): {}", key, value)
        )),
    }
}

impl FromIni for MatcherConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "matcher" {
            return None;
        }

        match key {
            "batch_cutoff" => Some(parse_cutoff(key, value).map(|c| self.batch_cutoff = c)),
            "fallback_cutoff" => Some(parse_cutoff(key, value).map(|c| self.fallback_cutoff = c)),
            "live_cutoff" => Some(parse_cutoff(key, value).map(|c| self.live_cutoff = c)),
            "live_limit" => {
                match value.parse() {
                    Ok(limit) => {
                        self.live_limit = limit;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid live_limit: {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, cutoff) in [
            ("batch_cutoff", self.batch_cutoff),
            ("fallback_cutoff", self.fallback_cutoff),
            ("live_cutoff", self.live_cutoff),
        ] {
            if !(0.0..=100.0).contains(&cutoff) {
                return Err(Error::Config(
                    format!("{} must be between 0 and 100, got {}", name, cutoff)
                ));
            }
        }
        if self.live_limit == 0 {
            return Err(Error::Config("live_limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}
