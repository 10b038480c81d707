//! Feed error types.

use std::path::PathBuf;

/// Errors that make an input file unusable. These abort the run.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The file could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON
    #[error("invalid JSON in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    /// The CSV header could not be read
    #[error("invalid CSV in {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },

    /// The file decoded but does not have the expected shape
    #[error("unexpected structure in {}: {reason}", path.display())]
    Structure { path: PathBuf, reason: &'static str },
}

/// Error converting one record into domain types. The record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Failed to parse a TIPLOC
    #[error("invalid TIPLOC: {0}")]
    InvalidTiploc(String),

    /// Failed to parse an operator code
    #[error("invalid operator code: {0}")]
    InvalidOperator(String),
}
