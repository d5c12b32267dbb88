// Drug name normalization: punctuation folding and dosage/formulation stop words

use ahash::AHashSet;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::types::value_text;
use super::{TextParser, ParserError, Result};

/// Dosage units and formulation words that carry no identity for a drug name.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "mg", "mcg", "ml", "gm", "g", "tab", "tabs", "tablet", "tablets", "caps", "cap", "capsule",
    "capsules", "vial", "amp", "ampoule", "susp", "suspension", "syrup", "syr", "eff", "sachets",
    "sachet", "granules", "eye", "drops", "drop", "ointment", "cream", "gel", "topical", "solution",
    "iv", "im", "inj", "injection", "fc", "sr", "retard", "forte", "extra", "plus",
];

lazy_static! {
    // Anything outside latin lowercase, digits, the Arabic block and whitespace
    static ref NOISE: Regex = Regex::new(r"[^a-z0-9\x{0600}-\x{06FF}\s]").unwrap();
    static ref DIGITS_ONLY: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref DEFAULT_PARSER: DrugNameParser = DrugNameParser::new();
}

#[derive(Debug, Clone)]
pub struct DrugNameParser {
    stop_words: AHashSet<String>,
}

impl DrugNameParser {
    pub fn new() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Built-in stop words plus the contents of `path`, if given.
    /// A missing file is logged and ignored.
    pub fn with_stop_words_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut parser = Self::new();
        if let Some(path) = path {
            parser.load_stop_words(path)?;
        }
        Ok(parser)
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    /// Normalize a cell value; null and non-string values are rendered first.
    pub fn normalize_value(&self, value: &Value) -> String {
        self.normalize(&value_text(value))
    }
}

impl Default for DrugNameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TextParser for DrugNameParser {
    fn normalize(&self, text: &str) -> String {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return String::new();
        }

        let kept: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !self.is_stop_token(t))
            .collect();

        // Never reduce a non-empty name to nothing: "mg tab cream" stays as is
        if kept.is_empty() {
            return tokens.join(" ");
        }
        kept.join(" ")
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lowered = text.to_lowercase();
        NOISE
            .replace_all(&lowered, " ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn is_stop_token(&self, token: &str) -> bool {
        self.stop_words.contains(token) || DIGITS_ONLY.is_match(token)
    }

    fn load_stop_words<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let file = match File::open(path_ref) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Stop words file not found: {:?}, using built-in list only", path_ref);
                return Ok(());
            },
            Err(e) => return Err(ParserError::IoError(e)),
        };

        let reader = io::BufReader::new(file);
        let mut count = 0;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            let tokens = self.tokenize(word);
            if tokens.len() != 1 {
                return Err(ParserError::InvalidStopWord(
                    format!("line {}: '{}' is not a single token", line_num + 1, word)
                ));
            }
            if self.stop_words.insert(tokens[0].clone()) {
                count += 1;
            }
        }

        info!("Loaded {} additional stop words from {:?}", count, path_ref);
        debug!("Stop word set now holds {} entries", self.stop_words.len());
        Ok(())
    }
}

/// Normalize with the built-in stop word list.
pub fn normalize(text: &str) -> String {
    DEFAULT_PARSER.normalize(text)
}

/// Normalize a cell value with the built-in stop word list.
pub fn normalize_value(value: &Value) -> String {
    DEFAULT_PARSER.normalize_value(value)
}
