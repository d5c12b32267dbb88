use thiserror::Error;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0:?}")]
    MissingFile(PathBuf),

    #[error("File is empty: {0:?}")]
    EmptyFile(PathBuf),

    #[error("Input file has no rows: {0:?}")]
    EmptyInput(PathBuf),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Could not read {path:?} with any encoding/delimiter combination (last error: {reason})")]
    UnreadableFile {
        path: PathBuf,
        reason: String,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// Type alias for Result
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error conversions
impl Error {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedData(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn unreadable<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Error::UnreadableFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<crate::parser::ParserError> for Error {
    fn from(err: crate::parser::ParserError) -> Self {
        match err {
            crate::parser::ParserError::IoError(e) => Error::Io(e),
            other => Error::Config(other.to_string()),
        }
    }
}
