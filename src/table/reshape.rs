//! Reshape wide tables into normalized long records.
//!
//! A wide table carries one value column per calendar date. The reshaper
//! is a pure layout transform: one output record per (entity row, date
//! column), no aggregation. Schema problems fail fast as `TableError`
//! rather than being silently coerced.

use super::schema::{parse_date, LongRecord, ValueKind, WideTable};
use crate::utils::config::{FALSE_FLAGS, TRUE_FLAGS};
use crate::utils::error::TableError;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashSet;

/// Reshape a per-date-column table into long records
///
/// **Public** - main entry point for date-column layouts
///
/// # Arguments
/// * `table` - Parsed wide table
/// * `identity_columns` - Columns whose cells form the entity key
/// * `skip_columns` - Metadata columns excluded from the melt (e.g. Lat/Long)
/// * `kind` - Logical series the value cells belong to
///
/// # Returns
/// One `LongRecord` per (entity row, date column), in row-major order
///
/// # Errors
/// * `TableError::MissingColumn` - An identity column is absent
/// * `TableError::UnparseableDate` - A non-identity, non-skip column label
///   is not a calendar date
/// * `TableError::NonNumericValue` - A value cell is neither empty nor numeric
/// * `TableError::DuplicateRecord` - Two rows share the same entity key
pub fn reshape(
    table: &WideTable,
    identity_columns: &[&str],
    skip_columns: &[&str],
    kind: ValueKind,
) -> Result<Vec<LongRecord>, TableError> {
    let identity_indices = identity_columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>, _>>()?;

    let date_columns = resolve_date_columns(table, identity_columns, skip_columns)?;

    debug!(
        "Reshaping {} rows x {} date columns as {}",
        table.rows.len(),
        date_columns.len(),
        kind.as_str()
    );

    let mut records = Vec::with_capacity(table.rows.len() * date_columns.len());
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let entity_key = build_entity_key(row, &identity_indices);

        for (column_index, date) in &date_columns {
            if !seen.insert((entity_key.clone(), *date)) {
                return Err(TableError::DuplicateRecord {
                    entity_key,
                    date: *date,
                    kind: kind.as_str().to_string(),
                });
            }

            let cell = &row[*column_index];
            let value = parse_numeric_cell(cell, &table.headers[*column_index], row_index)?;

            records.push(LongRecord {
                entity_key: entity_key.clone(),
                date: *date,
                kind,
                value,
            });
        }
    }

    Ok(records)
}

/// Reshape a per-incident table (one row per event) into long records
///
/// **Public** - entry point for incident-format inputs
///
/// Each row yields an `IncidentCount` record with value 1.0 and a
/// flag-kind record carrying the parsed boolean, both keyed by the
/// row's unique incident identifier.
///
/// # Errors
/// * `TableError::DuplicateRecord` - A repeated incident identifier
/// * `TableError::NonNumericValue` - A flag cell with an unrecognized spelling
pub fn reshape_events(
    table: &WideTable,
    id_column: &str,
    date_column: &str,
    flag_column: &str,
) -> Result<Vec<LongRecord>, TableError> {
    let id_index = table.require_column(id_column)?;
    let date_index = table.require_column(date_column)?;
    let flag_index = table.require_column(flag_column)?;

    debug!("Reshaping {} incident rows", table.rows.len());

    let mut records = Vec::with_capacity(table.rows.len() * 2);
    let mut seen: HashSet<String> = HashSet::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let entity_key = row[id_index].trim().to_string();
        let date = parse_date(&row[date_index])?;

        if !seen.insert(entity_key.clone()) {
            return Err(TableError::DuplicateRecord {
                entity_key,
                date,
                kind: ValueKind::IncidentCount.as_str().to_string(),
            });
        }

        let flag = parse_flag_cell(&row[flag_index], flag_column, row_index)?;

        records.push(LongRecord {
            entity_key: entity_key.clone(),
            date,
            kind: ValueKind::IncidentCount,
            value: 1.0,
        });
        records.push(LongRecord {
            entity_key,
            date,
            kind: ValueKind::MurderFlag,
            value: flag,
        });
    }

    Ok(records)
}

/// Sum a static per-entity attribute, deduplicated by entity identifier
///
/// **Public** - population totals for rate denominators
///
/// An entity appearing in multiple source rows (e.g. one row per date)
/// contributes its attribute exactly once.
pub fn sum_population(
    table: &WideTable,
    id_column: &str,
    value_column: &str,
) -> Result<f64, TableError> {
    let id_index = table.require_column(id_column)?;
    let value_index = table.require_column(value_column)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut total = 0.0;

    for (row_index, row) in table.rows.iter().enumerate() {
        let id = row[id_index].trim();
        if !seen.insert(id) {
            continue;
        }
        total += parse_numeric_cell(&row[value_index], value_column, row_index)?;
    }

    Ok(total)
}

/// Resolve which columns are date columns, validating each label
///
/// **Private** - schema check at the reshaper's input boundary
fn resolve_date_columns(
    table: &WideTable,
    identity_columns: &[&str],
    skip_columns: &[&str],
) -> Result<Vec<(usize, NaiveDate)>, TableError> {
    let mut columns = Vec::new();

    for (index, header) in table.headers.iter().enumerate() {
        let name = header.as_str();
        if identity_columns.contains(&name) || skip_columns.contains(&name) {
            continue;
        }
        let date = parse_date(name).map_err(|_| TableError::UnparseableDate {
            column: header.clone(),
        })?;
        columns.push((index, date));
    }

    Ok(columns)
}

/// Join identity cells into a composite entity key
fn build_entity_key(row: &[String], identity_indices: &[usize]) -> String {
    identity_indices
        .iter()
        .map(|&i| row[i].trim())
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse a numeric cell; empty cells are 0.0 by policy
///
/// **Private** - shared by reshape and sum_population
fn parse_numeric_cell(cell: &str, column: &str, row: usize) -> Result<f64, TableError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| TableError::NonNumericValue {
            column: column.to_string(),
            row,
            value: cell.to_string(),
        })
}

/// Parse a boolean flag cell into 0.0 / 1.0
///
/// **Private** - internal helper for reshape_events
fn parse_flag_cell(cell: &str, column: &str, row: usize) -> Result<f64, TableError> {
    let trimmed = cell.trim();
    if TRUE_FLAGS.contains(&trimmed) {
        Ok(1.0)
    } else if FALSE_FLAGS.contains(&trimmed) {
        Ok(0.0)
    } else {
        Err(TableError::NonNumericValue {
            column: column.to_string(),
            row,
            value: cell.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wide_table() -> WideTable {
        WideTable::new(
            vec![
                "Province".to_string(),
                "Country".to_string(),
                "Lat".to_string(),
                "1/22/20".to_string(),
                "1/23/20".to_string(),
            ],
            vec![
                vec![
                    "".to_string(),
                    "Italy".to_string(),
                    "41.9".to_string(),
                    "1".to_string(),
                    "2".to_string(),
                ],
                vec![
                    "Hubei".to_string(),
                    "China".to_string(),
                    "30.9".to_string(),
                    "444".to_string(),
                    "".to_string(),
                ],
            ],
        )
    }

    #[test]
    fn test_reshape_basic() {
        let records = reshape(
            &wide_table(),
            &["Country", "Province"],
            &["Lat"],
            ValueKind::Cases,
        )
        .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].entity_key, "Italy|");
        assert_eq!(records[0].value, 1.0);
        assert_eq!(records[2].entity_key, "China|Hubei");
        // Missing cell parses as zero
        assert_eq!(records[3].value, 0.0);
    }

    #[test]
    fn test_reshape_missing_identity_column() {
        let err = reshape(&wide_table(), &["Region"], &["Lat"], ValueKind::Cases).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(_)));
    }

    #[test]
    fn test_reshape_unparseable_date_column() {
        // "Lat" not skipped, so it must parse as a date
        let err = reshape(&wide_table(), &["Country", "Province"], &[], ValueKind::Cases)
            .unwrap_err();
        assert!(matches!(err, TableError::UnparseableDate { .. }));
    }

    #[test]
    fn test_reshape_non_numeric_cell() {
        let mut table = wide_table();
        table.rows[0][3] = "n/a".to_string();
        let err = reshape(
            &table,
            &["Country", "Province"],
            &["Lat"],
            ValueKind::Cases,
        )
        .unwrap_err();
        assert!(matches!(err, TableError::NonNumericValue { .. }));
    }

    #[test]
    fn test_reshape_duplicate_entity() {
        let mut table = wide_table();
        let dup = table.rows[0].clone();
        table.rows.push(dup);
        let err = reshape(
            &table,
            &["Country", "Province"],
            &["Lat"],
            ValueKind::Cases,
        )
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateRecord { .. }));
    }

    #[test]
    fn test_reshape_events() {
        let table = WideTable::new(
            vec![
                "INCIDENT_KEY".to_string(),
                "OCCUR_DATE".to_string(),
                "STATISTICAL_MURDER_FLAG".to_string(),
            ],
            vec![
                vec![
                    "100".to_string(),
                    "01/05/2020".to_string(),
                    "true".to_string(),
                ],
                vec![
                    "101".to_string(),
                    "01/06/2020".to_string(),
                    "false".to_string(),
                ],
            ],
        );

        let records =
            reshape_events(&table, "INCIDENT_KEY", "OCCUR_DATE", "STATISTICAL_MURDER_FLAG")
                .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].kind, ValueKind::IncidentCount);
        assert_eq!(records[0].value, 1.0);
        assert_eq!(records[1].kind, ValueKind::MurderFlag);
        assert_eq!(records[1].value, 1.0);
        assert_eq!(records[3].value, 0.0);
    }

    #[test]
    fn test_reshape_events_duplicate_id() {
        let table = WideTable::new(
            vec![
                "INCIDENT_KEY".to_string(),
                "OCCUR_DATE".to_string(),
                "FLAG".to_string(),
            ],
            vec![
                vec!["100".to_string(), "01/05/2020".to_string(), "Y".to_string()],
                vec!["100".to_string(), "01/06/2020".to_string(), "N".to_string()],
            ],
        );

        let err = reshape_events(&table, "INCIDENT_KEY", "OCCUR_DATE", "FLAG").unwrap_err();
        assert!(matches!(err, TableError::DuplicateRecord { .. }));
    }

    #[test]
    fn test_reshape_events_bad_flag() {
        let table = WideTable::new(
            vec![
                "INCIDENT_KEY".to_string(),
                "OCCUR_DATE".to_string(),
                "FLAG".to_string(),
            ],
            vec![vec![
                "100".to_string(),
                "01/05/2020".to_string(),
                "maybe".to_string(),
            ]],
        );

        let err = reshape_events(&table, "INCIDENT_KEY", "OCCUR_DATE", "FLAG").unwrap_err();
        assert!(matches!(err, TableError::NonNumericValue { .. }));
    }

    #[test]
    fn test_sum_population_dedupes_entities() {
        let table = WideTable::new(
            vec!["Combined_Key".to_string(), "Population".to_string()],
            vec![
                vec!["Kings, New York, US".to_string(), "2559903".to_string()],
                vec!["Kings, New York, US".to_string(), "2559903".to_string()],
                vec!["Queens, New York, US".to_string(), "2253858".to_string()],
            ],
        );

        let total = sum_population(&table, "Combined_Key", "Population").unwrap();
        assert_eq!(total, 2559903.0 + 2253858.0);
    }
}
