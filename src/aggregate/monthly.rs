//! Collapse long records into monthly buckets.
//!
//! Daily totals are summed across entities, then folded into calendar
//! months. How a month's value is derived depends on the series mode:
//! cumulative series keep the last daily total observed in the month,
//! incremental series sum their daily totals. Months with no
//! contributing records are omitted, never synthesized.

use crate::table::schema::{LongRecord, ValueKind};
use crate::utils::error::AggregateError;
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;

/// How daily totals of a series combine into a month's value
///
/// **Public** - configuration flag supplied per series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMode {
    /// Daily totals are running cumulative counts; the month's value is
    /// the last chronological daily total observed in the month.
    Cumulative,

    /// Daily totals are per-day counts; the month's value is their sum.
    Incremental,

    /// Daily totals are cumulative, but the month's value is the sum of
    /// day-over-day increases, each clamped at zero. Upstream data
    /// revisions (negative daily deltas) are discarded at the daily step
    /// and nowhere else.
    NewFromCumulative,
}

impl SeriesMode {
    /// Stable string form used in reports and CLI parsing
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesMode::Cumulative => "cumulative",
            SeriesMode::Incremental => "incremental",
            SeriesMode::NewFromCumulative => "new-from-cumulative",
        }
    }
}

impl std::str::FromStr for SeriesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cumulative" => Ok(SeriesMode::Cumulative),
            "incremental" => Ok(SeriesMode::Incremental),
            "new-from-cumulative" => Ok(SeriesMode::NewFromCumulative),
            other => Err(format!(
                "Unknown series mode '{}' (expected cumulative, incremental, or new-from-cumulative)",
                other
            )),
        }
    }
}

/// One calendar month of an aggregated series
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// First day of the month
    pub period_start: NaiveDate,

    /// Value at period end (cumulative modes) or period total
    /// (incremental modes)
    pub value: f64,
}

/// Aggregate long records of one kind into ordered monthly buckets
///
/// **Public** - main entry point for monthly aggregation
///
/// # Arguments
/// * `records` - Long records from the reshaper (any mix of kinds)
/// * `kind` - Which logical series to aggregate
/// * `mode` - How daily totals fold into months
///
/// # Returns
/// Buckets sorted by period_start, one per month with data
///
/// # Errors
/// * `AggregateError::NoRecords` - No records of `kind` in the input
///
/// # Algorithm
/// 1. Sum values per date across entities
/// 2. Sort dates ascending
/// 3. Partition into months by first-of-month truncation
/// 4. Fold each month per `mode`
pub fn aggregate_monthly(
    records: &[LongRecord],
    kind: ValueKind,
    mode: SeriesMode,
) -> Result<Vec<MonthlyBucket>, AggregateError> {
    // Step 1+2: daily totals, sorted by date (BTreeMap keeps date order)
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.kind == kind) {
        *daily.entry(record.date).or_insert(0.0) += record.value;
    }

    if daily.is_empty() {
        return Err(AggregateError::NoRecords {
            kind: kind.as_str().to_string(),
        });
    }

    debug!(
        "Aggregating {} daily totals of {} ({})",
        daily.len(),
        kind.as_str(),
        mode.as_str()
    );

    // Step 3+4: fold into months
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut previous_daily = 0.0;

    for (date, total) in &daily {
        let month = month_start(*date);
        match mode {
            SeriesMode::Cumulative => {
                // Dates iterate ascending, so the last write wins
                months.insert(month, *total);
            }
            SeriesMode::Incremental => {
                *months.entry(month).or_insert(0.0) += total;
            }
            SeriesMode::NewFromCumulative => {
                let delta = (total - previous_daily).max(0.0);
                previous_daily = *total;
                *months.entry(month).or_insert(0.0) += delta;
            }
        }
    }

    Ok(months
        .into_iter()
        .map(|(period_start, value)| MonthlyBucket {
            period_start,
            value,
        })
        .collect())
}

/// Convert per-period buckets into a running cumulative series
///
/// **Public** - used before rate derivation when the aggregation mode
/// produced per-period values rather than running totals
pub fn accumulate(buckets: &[MonthlyBucket]) -> Vec<MonthlyBucket> {
    let mut running = 0.0;
    buckets
        .iter()
        .map(|bucket| {
            running += bucket.value;
            MonthlyBucket {
                period_start: bucket.period_start,
                value: running,
            }
        })
        .collect()
}

/// Truncate a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(key: &str, date: (i32, u32, u32), kind: ValueKind, value: f64) -> LongRecord {
        LongRecord {
            entity_key: key.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            kind,
            value,
        }
    }

    #[test]
    fn test_cumulative_takes_last_daily_value() {
        let records = vec![
            record("a", (2020, 3, 5), ValueKind::Cases, 10.0),
            record("a", (2020, 3, 20), ValueKind::Cases, 25.0),
            record("a", (2020, 4, 10), ValueKind::Cases, 40.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::Cases, SeriesMode::Cumulative).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[0].period_start,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
        assert_eq!(buckets[0].value, 25.0);
        assert_eq!(buckets[1].value, 40.0);
    }

    #[test]
    fn test_cumulative_sums_across_entities() {
        let records = vec![
            record("a", (2020, 3, 31), ValueKind::Cases, 10.0),
            record("b", (2020, 3, 31), ValueKind::Cases, 5.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::Cases, SeriesMode::Cumulative).unwrap();

        assert_eq!(buckets[0].value, 15.0);
    }

    #[test]
    fn test_incremental_sums_daily_values() {
        let records = vec![
            record("a", (2020, 1, 5), ValueKind::IncidentCount, 1.0),
            record("b", (2020, 1, 5), ValueKind::IncidentCount, 1.0),
            record("c", (2020, 1, 20), ValueKind::IncidentCount, 1.0),
            record("d", (2020, 2, 1), ValueKind::IncidentCount, 1.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::IncidentCount, SeriesMode::Incremental)
                .unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].value, 3.0);
        assert_eq!(buckets[1].value, 1.0);
    }

    #[test]
    fn test_new_from_cumulative_clamps_daily_revisions() {
        // Cumulative totals dip on 3/10 (upstream revision); the negative
        // daily delta is discarded, not propagated.
        let records = vec![
            record("a", (2020, 3, 5), ValueKind::Cases, 10.0),
            record("a", (2020, 3, 10), ValueKind::Cases, 8.0),
            record("a", (2020, 3, 20), ValueKind::Cases, 25.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::Cases, SeriesMode::NewFromCumulative).unwrap();

        // 10 + max(0, -2) + 17 = 27
        assert_eq!(buckets[0].value, 27.0);
    }

    #[test]
    fn test_empty_month_omitted() {
        let records = vec![
            record("a", (2020, 1, 15), ValueKind::Cases, 5.0),
            record("a", (2020, 3, 15), ValueKind::Cases, 9.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::Cases, SeriesMode::Cumulative).unwrap();

        // No synthetic February bucket
        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[1].period_start,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_monotonic_for_cumulative_input() {
        let records = vec![
            record("a", (2020, 1, 31), ValueKind::Cases, 5.0),
            record("a", (2020, 2, 28), ValueKind::Cases, 9.0),
            record("a", (2020, 3, 31), ValueKind::Cases, 9.0),
            record("a", (2020, 4, 30), ValueKind::Cases, 20.0),
        ];

        let buckets =
            aggregate_monthly(&records, ValueKind::Cases, SeriesMode::Cumulative).unwrap();

        for pair in buckets.windows(2) {
            assert!(pair[1].value >= pair[0].value);
        }
    }

    #[test]
    fn test_no_records_of_kind() {
        let records = vec![record("a", (2020, 1, 1), ValueKind::Cases, 1.0)];
        let err = aggregate_monthly(&records, ValueKind::Deaths, SeriesMode::Cumulative)
            .unwrap_err();
        assert!(matches!(err, AggregateError::NoRecords { .. }));
    }

    #[test]
    fn test_accumulate() {
        let buckets = vec![
            MonthlyBucket {
                period_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                value: 3.0,
            },
            MonthlyBucket {
                period_start: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                value: 4.0,
            },
        ];

        let cumulative = accumulate(&buckets);
        assert_eq!(cumulative[0].value, 3.0);
        assert_eq!(cumulative[1].value, 7.0);
    }

    #[test]
    fn test_series_mode_from_str() {
        assert_eq!(
            "cumulative".parse::<SeriesMode>().unwrap(),
            SeriesMode::Cumulative
        );
        assert_eq!(
            "new-from-cumulative".parse::<SeriesMode>().unwrap(),
            SeriesMode::NewFromCumulative
        );
        assert!("weekly".parse::<SeriesMode>().is_err());
    }
}
