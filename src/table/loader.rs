//! CSV loading for wide tables.
//!
//! Parses CSV text into a `WideTable`, handling quoted fields
//! (embedded commas, doubled quotes). Sources may be local paths or
//! http(s) URLs; URLs are fetched through the fetch client.

use super::schema::WideTable;
use crate::fetch::FetchClient;
use crate::utils::error::TableError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

/// Parse CSV text into a wide table
///
/// **Public** - main entry point for CSV parsing
///
/// # Arguments
/// * `text` - Complete CSV document, header row first
///
/// # Returns
/// Parsed table with one cell vector per data row
///
/// # Errors
/// * `TableError::Empty` - No header row or no data rows
/// * `TableError::RaggedRow` - A row with a cell count different from the header
pub fn parse_csv(text: &str) -> Result<WideTable, TableError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines.next().ok_or(TableError::Empty)?;
    let headers = split_csv_line(header_line);

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let cells = split_csv_line(line);
        if cells.len() != headers.len() {
            return Err(TableError::RaggedRow {
                row: index + 1,
                expected: headers.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(TableError::Empty);
    }

    debug!("Parsed CSV: {} columns, {} rows", headers.len(), rows.len());

    Ok(WideTable::new(headers, rows))
}

/// Load a wide table from a local path or an http(s) URL
///
/// **Public** - used by commands to resolve user-supplied sources
pub fn load_table(source: &str) -> Result<WideTable> {
    let text = if is_remote(source) {
        info!("Fetching remote dataset: {}", source);
        let client = FetchClient::new().context("Failed to create fetch client")?;
        client
            .fetch_csv(source)
            .with_context(|| format!("Failed to fetch dataset from {}", source))?
    } else {
        debug!("Reading local dataset: {}", source);
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read dataset file {}", source))?
    };

    let table = parse_csv(&text).with_context(|| format!("Failed to parse CSV from {}", source))?;
    Ok(table)
}

/// Whether a source string names a remote dataset
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Split one CSV line into cells, honoring double-quote escaping
///
/// **Private** - internal parsing logic
///
/// A quoted cell may contain commas; a doubled quote inside a quoted
/// cell is a literal quote.
fn split_csv_line(line: &str) -> Vec<String> {
    // CRLF-terminated files leave a trailing \r on every line
    let line = line.trim_end_matches('\r');

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote: literal quote character
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(current.clone());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells
}
