// reader/delimited.rs
//
// Delimited text of unknown encoding and delimiter, possibly preceded by
// metadata lines. Readability is decided by an ordered attempt plan:
// skip-count (outermost), then encoding, then delimiter. The first attempt
// whose trial parse is accepted is used for the full parse.

use std::borrow::Cow;
use log::{debug, info, trace};
use memchr::memchr_iter;
use serde_json::Value;

use crate::config::subsystems::ReaderConfig;
use crate::types::{Record, Table};
use super::unique_headers;

pub const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateEncoding {
    Utf8Bom,
    Utf8,
    Windows1252,
    Latin1,
    Windows1256,
}

impl CandidateEncoding {
    /// Encodings in order of preference.
    pub const ALL: [CandidateEncoding; 5] = [
        CandidateEncoding::Utf8Bom,
        CandidateEncoding::Utf8,
        CandidateEncoding::Windows1252,
        CandidateEncoding::Latin1,
        CandidateEncoding::Windows1256,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "utf-8-sig" | "utf8-sig" => Some(CandidateEncoding::Utf8Bom),
            "utf-8" | "utf8" => Some(CandidateEncoding::Utf8),
            "windows-1252" | "cp1252" => Some(CandidateEncoding::Windows1252),
            "iso-8859-1" | "latin1" | "latin-1" => Some(CandidateEncoding::Latin1),
            "windows-1256" | "cp1256" => Some(CandidateEncoding::Windows1256),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CandidateEncoding::Utf8Bom => "utf-8-sig",
            CandidateEncoding::Utf8 => "utf-8",
            CandidateEncoding::Windows1252 => "windows-1252",
            CandidateEncoding::Latin1 => "iso-8859-1",
            CandidateEncoding::Windows1256 => "windows-1256",
        }
    }

    /// Decodes the whole buffer; any malformed sequence is an error.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, String> {
        match self {
            CandidateEncoding::Utf8Bom => {
                let body = bytes
                    .strip_prefix(UTF8_BOM)
                    .ok_or_else(|| "no UTF-8 byte-order mark".to_string())?;
                std::str::from_utf8(body)
                    .map(Cow::Borrowed)
                    .map_err(|e| format!("utf-8-sig: {}", e))
            },
            CandidateEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| format!("utf-8: {}", e)),
            CandidateEncoding::Windows1252 => {
                // encoding_rs maps the five undefined code page bytes to C1
                // controls; treat them as decode errors instead
                if let Some(b) = bytes.iter().find(|b| WINDOWS_1252_UNDEFINED.contains(b)) {
                    return Err(format!("windows-1252: undefined byte 0x{:02X}", b));
                }
                decode_legacy(encoding_rs::WINDOWS_1252, bytes)
            },
            // Every byte maps to the code point of the same value
            CandidateEncoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
            CandidateEncoding::Windows1256 => {
                decode_legacy(encoding_rs::WINDOWS_1256, bytes)
            },
        }
    }
}

fn decode_legacy<'a>(encoding: &'static encoding_rs::Encoding, bytes: &'a [u8]) -> Result<Cow<'a, str>, String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| format!("{}: malformed byte sequence", encoding.name()))
}

/// One point of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub skip: usize,
    pub encoding: CandidateEncoding,
    pub delimiter: u8,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "skip={} encoding={} delimiter={:?}",
            self.skip,
            self.encoding.label(),
            self.delimiter as char
        )
    }
}

/// Every attempt in order of preference, for skip-counts `0..=max_skip`.
pub fn attempt_plan(max_skip: usize, encodings: &[CandidateEncoding]) -> impl Iterator<Item = Attempt> + '_ {
    (0..=max_skip).flat_map(move |skip| {
        encodings.iter().flat_map(move |&encoding| {
            DELIMITERS.into_iter().map(move |delimiter| Attempt { skip, encoding, delimiter })
        })
    })
}

/// The configured encoding preference, or the built-in order when the
/// configuration names none that are known.
pub fn configured_encodings(config: &ReaderConfig) -> Vec<CandidateEncoding> {
    let encodings: Vec<CandidateEncoding> = config
        .encodings
        .iter()
        .filter_map(|label| CandidateEncoding::from_label(label))
        .collect();
    if encodings.is_empty() {
        CandidateEncoding::ALL.to_vec()
    } else {
        encodings
    }
}

/// Runs the attempt plan over `bytes` and returns the first accepted attempt,
/// or the reason the last attempt was rejected.
pub fn detect(bytes: &[u8], config: &ReaderConfig) -> Result<Attempt, String> {
    let encodings = configured_encodings(config);
    // Each encoding is decoded once; the plan order is unaffected
    let decoded: Vec<(CandidateEncoding, Result<Cow<'_, str>, String>)> = encodings
        .iter()
        .map(|encoding| (*encoding, encoding.decode(bytes)))
        .collect();

    let mut last_error = String::from("no attempt was made");
    let mut tried = 0usize;

    for attempt in attempt_plan(config.max_skip_rows, &encodings) {
        tried += 1;
        let text = match decoded.iter().find(|(e, _)| *e == attempt.encoding) {
            Some((_, Ok(text))) => text,
            Some((_, Err(e))) => {
                last_error = e.clone();
                continue;
            },
            None => continue,
        };

        let outcome = skip_lines(text, attempt.skip)
            .ok_or_else(|| format!("fewer than {} lines", attempt.skip))
            .and_then(|body| trial_parse(body, attempt.delimiter, config.trial_rows));

        match outcome {
            Ok(()) => {
                info!("Accepted delimited layout after {} attempts: {}", tried, attempt);
                return Ok(attempt);
            },
            Err(reason) => {
                trace!("Rejected {}: {}", attempt, reason);
                last_error = format!("{}: {}", attempt, reason);
            },
        }
    }

    debug!("Attempt plan exhausted after {} attempts", tried);
    Err(last_error)
}

/// Detects the layout, then parses the full buffer (or `row_limit` rows).
pub fn read_bytes(bytes: &[u8], config: &ReaderConfig, row_limit: Option<usize>) -> Result<Table, String> {
    let attempt = detect(bytes, config)?;
    parse_with(bytes, attempt, row_limit)
}

/// Parses `bytes` with a known layout.
pub fn parse_with(bytes: &[u8], attempt: Attempt, row_limit: Option<usize>) -> Result<Table, String> {
    let text = attempt.encoding.decode(bytes)?;
    let body = skip_lines(&text, attempt.skip)
        .ok_or_else(|| format!("fewer than {} lines", attempt.skip))?;

    let mut reader = csv_reader(body, attempt.delimiter);
    let columns = unique_headers(
        reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(str::to_string),
    );

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        if row_limit.map_or(false, |limit| rows.len() >= limit) {
            break;
        }
        let record = result.map_err(|e| format!("row {}: {}", line + 1, e))?;
        if is_blank(&record) {
            continue;
        }
        if record.len() > columns.len() {
            debug!(
                "Row {} has {} fields for {} columns, extra fields dropped",
                line + 1,
                record.len(),
                columns.len()
            );
        }
        let mut row = Record::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let value = match record.get(i) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

fn csv_reader(body: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes())
}

/// Text after the first `skip` lines, or `None` when there are fewer lines.
fn skip_lines(text: &str, skip: usize) -> Option<&str> {
    if skip == 0 {
        return Some(text);
    }
    memchr_iter(b'\n', text.as_bytes())
        .nth(skip - 1)
        .map(|pos| &text[pos + 1..])
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Accepts a layout when the header is non-empty, no row is wider than the
/// header, and the delimiter is evidenced by the data.
fn trial_parse(body: &str, delimiter: u8, trial_rows: usize) -> Result<(), String> {
    let mut reader = csv_reader(body, delimiter);
    let header = reader.headers().map_err(|e| e.to_string())?.clone();
    if is_blank(&header) {
        return Err("empty header row".to_string());
    }
    let width = header.len();
    let others: Vec<u8> = DELIMITERS.iter().copied().filter(|d| *d != delimiter).collect();

    if width == 1 && contains_any(&header, &others) {
        return Err("single-column header contains another delimiter".to_string());
    }

    let mut filled = 0usize;
    let mut split = 0usize;
    for (line, result) in reader.records().take(trial_rows).enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if is_blank(&record) {
            continue;
        }
        filled += 1;
        if record.len() > width {
            return Err(format!("row {} has {} fields, header has {}", line + 1, record.len(), width));
        }
        if width == 1 && contains_any(&record, &others) {
            return Err(format!("row {} contains another delimiter", line + 1));
        }
        if record.len() > 1 {
            split += 1;
        }
    }
    // Footers and short trailing rows are fine as long as some row splits
    if width > 1 && filled > 0 && split == 0 {
        return Err(format!("none of {} trial rows split on the delimiter", filled));
    }
    Ok(())
}

fn contains_any(record: &csv::StringRecord, delimiters: &[u8]) -> bool {
    record
        .iter()
        .any(|field| field.bytes().any(|b| delimiters.contains(&b)))
}
