pub mod drug_name;
pub mod script;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("Invalid stop word entry: {0}")]
   InvalidStopWord(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

pub trait TextParser: Sync + Send {
    /// Fold text into the canonical key used for fuzzy comparison
    fn normalize(&self, text: &str) -> String;

    /// Tokens of the cleaned text before stop word filtering
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Whether a single token is noise (dosage unit, formulation word, bare number)
    fn is_stop_token(&self, token: &str) -> bool;

    /// Load additional stop words from a file
    fn load_stop_words<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
}

pub use self::drug_name::{DrugNameParser, normalize, normalize_value};
pub use self::script::{is_arabic_script, NameLanguage};
