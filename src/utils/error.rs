//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while loading or reshaping a wide table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Required column not found: {0}")]
    MissingColumn(String),

    #[error("Column label is not a parseable calendar date: {column}")]
    UnparseableDate { column: String },

    #[error("Non-numeric value in column '{column}', row {row}: '{value}'")]
    NonNumericValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Duplicate record for entity '{entity_key}' on {date} ({kind})")]
    DuplicateRecord {
        entity_key: String,
        date: NaiveDate,
        kind: String,
    },

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Table has no data rows")]
    Empty,
}

/// Errors that can occur during monthly aggregation
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("No records of kind '{kind}' to aggregate")]
    NoRecords { kind: String },
}

/// Errors that can occur when computing the display scale coefficient
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Scale denominator series '{0}' is all-null or has non-positive maximum")]
    DivisionUndefined(String),

    #[error("Scale numerator series '{0}' has no usable values")]
    EmptySeries(String),
}

/// Errors that can occur during the regression fit
#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("Insufficient joined periods for fit: need {required}, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("Independent series has zero variance")]
    DegenerateVariance,
}

/// Errors that can occur while fetching a remote dataset
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    BadStatus { status: u16, url: String },

    #[error("Empty response body from {0}")]
    EmptyBody(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
