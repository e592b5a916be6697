//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution. Null rate values are
//! serialized as JSON null; consumers rely on that distinction.

use crate::aggregate::{MonthlyBucket, RateRecord};
use crate::regression::RegressionResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Human-readable label for the analyzed dataset
    pub dataset: String,

    /// Series mode the aggregation ran under
    pub mode: String,

    /// Population denominator used for event rates, if any
    pub population: Option<f64>,

    /// Monthly base-event series (cumulative at period end)
    pub base_series: Vec<PeriodValue>,

    /// Monthly adverse-outcome series (cumulative at period end)
    pub adverse_series: Vec<PeriodValue>,

    /// Derived rate statistics per period
    pub rates: Vec<RateRow>,

    /// Display scale coefficient between the two rate series, if computable
    pub scale_coefficient: Option<f64>,

    /// Cross-series regression, if enough joined periods existed
    pub regression: Option<RegressionSummary>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One (period, value) point of an aggregated monthly series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodValue {
    /// First day of the month
    pub period_start: NaiveDate,

    /// Series value for the period
    pub value: f64,
}

/// Derived rate statistics for one period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRow {
    /// First day of the month
    pub period_start: NaiveDate,

    /// Base events newly observed this period (signed)
    pub new_base: f64,

    /// Cumulative base events at the end of the prior period
    pub previous_cumulative: f64,

    /// Population not yet affected at period start
    pub susceptible_population: Option<f64>,

    /// Adverse outcomes newly observed this period
    pub new_adverse: f64,

    /// new_base / susceptible_population (null when undefined)
    pub event_rate: Option<f64>,

    /// new_adverse / new_base (null when undefined)
    pub adverse_ratio: Option<f64>,

    /// cumulative adverse / cumulative base (null when undefined)
    pub cumulative_ratio: Option<f64>,
}

/// Regression coefficients and fit quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub slope: f64,
    pub intercept: f64,
    pub slope_std_err: f64,
    pub intercept_std_err: f64,
    pub p_value_slope: f64,
    pub p_value_intercept: f64,
    pub r_squared: f64,
    pub n_observations: usize,

    /// Fitted value per joined period, in join order
    pub fitted: Vec<FittedPoint>,
}

/// One fitted point of the regression line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPoint {
    pub period_start: NaiveDate,
    pub fitted: f64,
}

impl From<&MonthlyBucket> for PeriodValue {
    fn from(bucket: &MonthlyBucket) -> Self {
        Self {
            period_start: bucket.period_start,
            value: bucket.value,
        }
    }
}

impl From<&RateRecord> for RateRow {
    fn from(record: &RateRecord) -> Self {
        Self {
            period_start: record.period_start,
            new_base: record.new_base,
            previous_cumulative: record.previous_cumulative,
            susceptible_population: record.susceptible_population,
            new_adverse: record.new_adverse,
            event_rate: record.event_rate,
            adverse_ratio: record.adverse_ratio,
            cumulative_ratio: record.cumulative_ratio,
        }
    }
}

impl From<&RegressionResult> for RegressionSummary {
    fn from(result: &RegressionResult) -> Self {
        let fitted = result
            .periods
            .iter()
            .zip(&result.fitted_values)
            .map(|(period, value)| FittedPoint {
                period_start: *period,
                fitted: *value,
            })
            .collect();

        Self {
            slope: result.slope,
            intercept: result.intercept,
            slope_std_err: result.slope_std_err,
            intercept_std_err: result.intercept_std_err,
            p_value_slope: result.p_value_slope,
            p_value_intercept: result.p_value_intercept,
            r_squared: result.r_squared,
            n_observations: result.n_observations,
            fitted,
        }
    }
}
