//! dawaa matches free-text drug names against a bilingual (English/Arabic)
//! reference database. It provides name normalization, a cached reference
//! store, robust reading of user spreadsheets and delimited exports, batch
//! matching with export, and interactive top-N search.

// Module declarations
pub mod error;
pub mod types;
pub mod parser;
pub mod config;
pub mod reader;
pub mod storage;
pub mod matcher;
pub mod export;
pub mod utils;

// Re-exports
pub use error::{Error, Result};
pub use types::{Record, Table};
pub use parser::{DrugNameParser, NameLanguage, TextParser, normalize, is_arabic_script};
pub use reader::{InputFormat, ReadOptions, SheetSelector, TabularReader};
pub use storage::{ReferenceSet, ReferenceStore};
pub use matcher::{LiveSearch, MatchOutcome, MatchRequest, MatchResult, MatchingPipeline};
pub use export::OutputFormat;
pub use utils::{ProgressObserver, NoopObserver, FnObserver, ProgressBarObserver};

// Re-export the config from config module
pub use config::DawaaConfig;
