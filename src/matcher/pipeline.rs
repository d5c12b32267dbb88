// matcher/pipeline.rs
//
// Batch matching: load the reference set, read the user's table, match each
// row's query against the bilingual name index, export the result.

use std::path::{Path, PathBuf};
use std::time::Instant;
use serde_json::Value;
use log::{info, debug};

use crate::config::subsystems::MatcherConfig;
use crate::error::{Error, Result};
use crate::export::{self, OutputFormat};
use crate::parser::{NameLanguage, TextParser};
use crate::reader::{ReadOptions, SheetSelector, TabularReader};
use crate::storage::{ReferenceSet, ReferenceStore};
use crate::types::{field_text, Record, Table};
use crate::utils::ProgressObserver;
use super::fuzzy;

pub const SEARCH_QUERY: &str = "search_query";
pub const MATCH_FOUND: &str = "match_found";
pub const MATCH_SCORE: &str = "match_score";
pub const EMPTY_QUERY: &str = "Empty Query";
pub const NO_MATCH: &str = "No Match Found";

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub input_path: PathBuf,
    /// Input column holding the drug name to look up.
    pub search_column: String,
    /// Input columns copied to the output, in this order.
    pub keep_input_fields: Vec<String>,
    /// Reference fields copied from the matched record.
    pub keep_reference_fields: Vec<String>,
    pub output_format: OutputFormat,
    pub sheet: Option<SheetSelector>,
}

impl MatchRequest {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(input_path: P, search_column: S) -> Self {
        Self {
            input_path: input_path.into(),
            search_column: search_column.into(),
            keep_input_fields: Vec::new(),
            keep_reference_fields: Vec::new(),
            output_format: OutputFormat::default(),
            sheet: None,
        }
    }
}

/// Per-run counts, logged at the end of every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub rows: usize,
    pub matched: usize,
    pub matched_by_fallback: usize,
    pub no_match: usize,
    pub empty_queries: usize,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub output_path: PathBuf,
    pub table: Table,
    pub summary: MatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowMatch {
    Empty,
    NoMatch,
    Found { id: usize, score: f64, fallback: bool },
}

pub struct MatchingPipeline<'a> {
    store: &'a ReferenceStore,
    reader: TabularReader,
    config: MatcherConfig,
}

impl<'a> MatchingPipeline<'a> {
    pub fn new(store: &'a ReferenceStore, reader: TabularReader, config: MatcherConfig) -> Self {
        Self { store, reader, config }
    }

    pub fn run(&self, request: &MatchRequest, observer: &dyn ProgressObserver) -> Result<MatchOutcome> {
        let start = Instant::now();

        observer.on_status("Loading reference database...");
        let reference = self.store.load_with_status(observer)?;

        observer.on_status("Reading input file...");
        let options = ReadOptions::with_sheet(request.sheet.clone());
        let input = self.reader.read(&request.input_path, None, &options)?;
        if input.is_empty() {
            return Err(Error::EmptyInput(request.input_path.clone()));
        }
        debug!("Input columns: {:?}", input.columns);

        observer.on_status("Matching items...");
        let total = input.len();
        let mut summary = MatchSummary { rows: total, ..Default::default() };
        let mut rows = Vec::with_capacity(total);
        for (i, row) in input.rows.iter().enumerate() {
            rows.push(self.match_row(row, request, &reference, &mut summary));
            observer.on_progress(i + 1, total);
        }
        let table = Table::with_columns(output_columns(request), rows);

        observer.on_status("Saving results...");
        let dir = request.input_path.parent().unwrap_or_else(|| Path::new(""));
        let output_path = export::output_path(dir, request.output_format);
        export::write_table(&table, &output_path, request.output_format)?;

        info!(
            "Matched {} rows in {:?}: {} matched ({} by fallback), {} without match, {} empty",
            summary.rows,
            start.elapsed(),
            summary.matched,
            summary.matched_by_fallback,
            summary.no_match,
            summary.empty_queries
        );
        Ok(MatchOutcome { output_path, table, summary })
    }

    fn match_row(
        &self,
        row: &Record,
        request: &MatchRequest,
        reference: &ReferenceSet,
        summary: &mut MatchSummary,
    ) -> Record {
        let raw = field_text(row, &request.search_column).trim().to_string();
        let language = NameLanguage::detect(&raw);

        let mut out = Record::new();
        for field in &request.keep_input_fields {
            out.insert(field.clone(), row.get(field).cloned().unwrap_or(Value::Null));
        }
        out.insert(SEARCH_QUERY.to_string(), Value::String(raw.clone()));

        match self.find(&raw, language, reference) {
            RowMatch::Empty => {
                summary.empty_queries += 1;
                out.insert(MATCH_FOUND.to_string(), Value::from(EMPTY_QUERY));
                out.insert(MATCH_SCORE.to_string(), Value::from(0));
            },
            RowMatch::NoMatch => {
                summary.no_match += 1;
                out.insert(MATCH_FOUND.to_string(), Value::from(NO_MATCH));
                out.insert(MATCH_SCORE.to_string(), Value::from(0));
            },
            RowMatch::Found { id, score, fallback } => {
                summary.matched += 1;
                if fallback {
                    summary.matched_by_fallback += 1;
                }
                let matched = reference.record(id);
                let name = matched
                    .map(|r| field_text(r, language.name_field()))
                    .unwrap_or_default();
                out.insert(MATCH_FOUND.to_string(), Value::String(name));
                out.insert(MATCH_SCORE.to_string(), Value::from(round2(score)));
                for field in &request.keep_reference_fields {
                    let value = matched.and_then(|r| r.get(field)).cloned().unwrap_or(Value::Null);
                    out.insert(field.clone(), value);
                }
            },
        }
        out
    }

    /// Normalized query at the batch cutoff first, then the lower-cased raw
    /// query at the fallback cutoff.
    fn find(&self, raw: &str, language: NameLanguage, reference: &ReferenceSet) -> RowMatch {
        let normalized = self.store.parser().normalize(raw);
        if normalized.is_empty() {
            return RowMatch::Empty;
        }
        let keys = reference.keys(language);

        if let Some((id, score)) = fuzzy::best(&normalized, keys, self.config.batch_cutoff) {
            return RowMatch::Found { id, score, fallback: false };
        }
        if let Some((id, score)) = fuzzy::best(&raw.to_lowercase(), keys, self.config.fallback_cutoff) {
            return RowMatch::Found { id, score, fallback: true };
        }
        RowMatch::NoMatch
    }
}

/// Kept input fields, the three match columns, then reference fields.
fn output_columns(request: &MatchRequest) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let names = request
        .keep_input_fields
        .iter()
        .map(String::as_str)
        .chain([SEARCH_QUERY, MATCH_FOUND, MATCH_SCORE])
        .chain(request.keep_reference_fields.iter().map(String::as_str));
    for name in names {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
