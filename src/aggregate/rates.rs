//! Derive period-over-period rate statistics from monthly series.
//!
//! Consumes two cumulative monthly series (base events and adverse
//! outcomes) and an optional population denominator. Every division is
//! guarded: a non-positive denominator yields a null rate for that one
//! record, never a failure, and the three guards are independent of
//! each other.

use super::monthly::MonthlyBucket;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

/// Rate statistics for one monthly period
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    /// First day of the period
    pub period_start: NaiveDate,

    /// Base events newly observed this period (signed; upstream
    /// revisions may make this negative)
    pub new_base: f64,

    /// Cumulative base events at the end of the prior period
    /// (0.0 for the first period)
    pub previous_cumulative: f64,

    /// Population not yet affected at period start
    /// (None when no population was supplied)
    pub susceptible_population: Option<f64>,

    /// Adverse outcomes newly observed this period
    pub new_adverse: f64,

    /// new_base / susceptible_population, if susceptible > 0
    pub event_rate: Option<f64>,

    /// new_adverse / new_base, if new_base > 0
    pub adverse_ratio: Option<f64>,

    /// cumulative adverse / cumulative base, if cumulative base > 0
    pub cumulative_ratio: Option<f64>,
}

/// Derive rate records from aligned cumulative monthly series
///
/// **Public** - main entry point for rate derivation
///
/// # Arguments
/// * `base` - Cumulative base-event buckets, sorted by period
/// * `adverse` - Cumulative adverse-outcome buckets; aligned by
///   period_start, periods missing here contribute 0.0
/// * `population` - Static denominator for the event rate, if known
///
/// # Returns
/// One record per base bucket, in period order. Index -1 is treated as
/// a synthetic zero-valued prior period.
pub fn derive_rates(
    base: &[MonthlyBucket],
    adverse: &[MonthlyBucket],
    population: Option<f64>,
) -> Vec<RateRecord> {
    let adverse_by_period: HashMap<NaiveDate, f64> = adverse
        .iter()
        .map(|b| (b.period_start, b.value))
        .collect();

    debug!(
        "Deriving rates across {} periods (population: {:?})",
        base.len(),
        population
    );

    let mut records = Vec::with_capacity(base.len());
    let mut previous_cumulative = 0.0;
    let mut previous_adverse = 0.0;

    for bucket in base {
        let cumulative = bucket.value;
        let cumulative_adverse = adverse_by_period
            .get(&bucket.period_start)
            .copied()
            .unwrap_or(0.0);

        // Signed by design: the only clamp in the pipeline lives in
        // SeriesMode::NewFromCumulative at the daily step.
        let new_base = cumulative - previous_cumulative;
        let new_adverse = cumulative_adverse - previous_adverse;

        let susceptible = population.map(|p| p - previous_cumulative);

        let event_rate = match susceptible {
            Some(s) if s > 0.0 => Some(new_base / s),
            _ => None,
        };

        let adverse_ratio = if new_base > 0.0 {
            Some(new_adverse / new_base)
        } else {
            None
        };

        let cumulative_ratio = if cumulative > 0.0 {
            Some(cumulative_adverse / cumulative)
        } else {
            None
        };

        records.push(RateRecord {
            period_start: bucket.period_start,
            new_base,
            previous_cumulative,
            susceptible_population: susceptible,
            new_adverse,
            event_rate,
            adverse_ratio,
            cumulative_ratio,
        });

        previous_cumulative = cumulative;
        previous_adverse = cumulative_adverse;
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buckets(values: &[f64]) -> Vec<MonthlyBucket> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MonthlyBucket {
                period_start: NaiveDate::from_ymd_opt(2020, i as u32 + 1, 1).unwrap(),
                value: *v,
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_event_rate_scenario() {
        // Cumulative [10, 25, 40] with population 1000
        let base = buckets(&[10.0, 25.0, 40.0]);
        let records = derive_rates(&base, &[], Some(1000.0));

        let new: Vec<f64> = records.iter().map(|r| r.new_base).collect();
        assert_eq!(new, vec![10.0, 15.0, 15.0]);

        let susceptible: Vec<f64> = records
            .iter()
            .map(|r| r.susceptible_population.unwrap())
            .collect();
        assert_eq!(susceptible, vec![1000.0, 990.0, 975.0]);

        let rates: Vec<f64> = records.iter().map(|r| r.event_rate.unwrap()).collect();
        assert!(close(rates[0], 0.0100));
        assert!(close(rates[1], 15.0 / 990.0));
        assert!(close(rates[2], 15.0 / 975.0));
    }

    #[test]
    fn test_adverse_ratio_scenario() {
        // Deaths [1, 2, 5] against cases [8, 26, 49]
        let base = buckets(&[8.0, 26.0, 49.0]);
        let adverse = buckets(&[1.0, 2.0, 5.0]);
        let records = derive_rates(&base, &adverse, None);

        let new_adverse: Vec<f64> = records.iter().map(|r| r.new_adverse).collect();
        assert_eq!(new_adverse, vec![1.0, 1.0, 3.0]);

        let ratios: Vec<f64> = records.iter().map(|r| r.adverse_ratio.unwrap()).collect();
        assert!(close(ratios[0], 0.125));
        assert!(close(ratios[1], 1.0 / 18.0));
        assert!(close(ratios[2], 3.0 / 23.0));

        // No population: event rate is null throughout
        assert!(records.iter().all(|r| r.event_rate.is_none()));
    }

    #[test]
    fn test_cumulative_ratio() {
        let base = buckets(&[8.0, 26.0]);
        let adverse = buckets(&[1.0, 2.0]);
        let records = derive_rates(&base, &adverse, None);

        assert!(close(records[0].cumulative_ratio.unwrap(), 1.0 / 8.0));
        assert!(close(records[1].cumulative_ratio.unwrap(), 2.0 / 26.0));
    }

    #[test]
    fn test_null_guards_are_independent() {
        // Population equal to prior cumulative: susceptible hits zero in
        // period 2, so the event rate is null there, but the adverse
        // ratio keeps its own positive denominator.
        let base = buckets(&[100.0, 150.0]);
        let adverse = buckets(&[10.0, 30.0]);
        let records = derive_rates(&base, &adverse, Some(100.0));

        assert!(records[0].event_rate.is_some());
        assert!(records[1].event_rate.is_none());
        assert!(records[1].adverse_ratio.is_some());
        assert!(records[1].cumulative_ratio.is_some());

        // And the reverse: a flat base series nulls the adverse ratio
        // while a positive susceptible population keeps the event rate.
        let flat = buckets(&[100.0, 100.0]);
        let records = derive_rates(&flat, &adverse, Some(1000.0));
        assert!(records[1].adverse_ratio.is_none());
        assert!(records[1].event_rate.is_some());
        assert!(records[1].cumulative_ratio.is_some());
    }

    #[test]
    fn test_conservation_of_unclamped_news() {
        // Includes a downward revision; signed news must still telescope
        let base = buckets(&[10.0, 8.0, 30.0]);
        let records = derive_rates(&base, &[], None);

        let total: f64 = records.iter().map(|r| r.new_base).sum();
        assert!(close(total, 30.0));
        assert!(records[1].new_base < 0.0);
    }

    #[test]
    fn test_empty_base() {
        let records = derive_rates(&[], &buckets(&[1.0]), Some(10.0));
        assert!(records.is_empty());
    }
}
