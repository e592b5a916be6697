//! Input table schema definitions.
//!
//! This module defines the wide-table layout the pipeline consumes
//! and the normalized long-record rows the reshaper produces.

use crate::utils::config::DATE_FORMATS;
use crate::utils::error::TableError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A parsed wide table: header row plus data rows
///
/// One column per calendar date, plus identity/metadata columns.
/// Every row has exactly `headers.len()` cells (the loader enforces this).
#[derive(Debug, Clone)]
pub struct WideTable {
    /// Column labels, in file order
    pub headers: Vec<String>,

    /// Data rows; each row has one cell per header
    pub rows: Vec<Vec<String>>,
}

impl WideTable {
    /// Create a table from headers and rows
    ///
    /// **Public** - constructor used by the loader and tests
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Look up a column index by label
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Look up a column index, failing with MissingColumn if absent
    ///
    /// **Public** - schema check at the reshaper's input boundary
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }
}

/// The logical series a long record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Cumulative confirmed case counts
    Cases,

    /// Cumulative death counts
    Deaths,

    /// Per-incident occurrence counts (one per record row)
    IncidentCount,

    /// Per-incident adverse-outcome flags (0 or 1)
    MurderFlag,
}

impl ValueKind {
    /// Stable string form used in error messages and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Cases => "cases",
            ValueKind::Deaths => "deaths",
            ValueKind::IncidentCount => "incident_count",
            ValueKind::MurderFlag => "murder_flag",
        }
    }
}

/// One normalized observation: (entity, date, kind, value)
///
/// Produced by the reshaper, consumed by the aggregator.
/// No two records share (entity_key, date, kind).
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    /// Composite of identity fields, joined in column order
    pub entity_key: String,

    /// Observation date
    pub date: NaiveDate,

    /// Which logical series this value belongs to
    pub kind: ValueKind,

    /// Observed value (missing cells parse as 0.0)
    pub value: f64,
}

/// Parse a date label or cell under the configured formats
///
/// **Public** - used by the reshaper for both column labels and date cells
///
/// Tries each format in `DATE_FORMATS` in order; the first match wins.
pub fn parse_date(text: &str) -> Result<NaiveDate, TableError> {
    let trimmed = text.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    Err(TableError::UnparseableDate {
        column: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date("2020-03-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_date_short_us() {
        let date = parse_date("1/22/20").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
    }

    #[test]
    fn test_parse_date_long_us() {
        let date = parse_date("01/22/2020").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("Lat").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_require_column() {
        let table = WideTable::new(
            vec!["Country".to_string(), "1/22/20".to_string()],
            vec![],
        );
        assert_eq!(table.require_column("Country").unwrap(), 0);
        assert!(table.require_column("Province").is_err());
    }
}
