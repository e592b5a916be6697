//! Versioned report assembly.
//!
//! The report bundles every pipeline product for one analysis run:
//! monthly series, rate records, the scale coefficient, and the
//! cross-series regression.

pub mod schema;

pub use schema::{FittedPoint, PeriodValue, RateRow, RegressionSummary, Report};

use crate::aggregate::{MonthlyBucket, RateRecord, SeriesMode};
use crate::regression::RegressionResult;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;

/// Assemble the output report from pipeline products
///
/// **Public** - used by commands to create final output
#[allow(clippy::too_many_arguments)]
pub fn build_report(
    dataset: &str,
    mode: SeriesMode,
    population: Option<f64>,
    base: &[MonthlyBucket],
    adverse: &[MonthlyBucket],
    rates: &[RateRecord],
    scale_coefficient: Option<f64>,
    regression: Option<&RegressionResult>,
) -> Report {
    Report {
        version: SCHEMA_VERSION.to_string(),
        dataset: dataset.to_string(),
        mode: mode.as_str().to_string(),
        population,
        base_series: base.iter().map(PeriodValue::from).collect(),
        adverse_series: adverse.iter().map(PeriodValue::from).collect(),
        rates: rates.iter().map(RateRow::from).collect(),
        scale_coefficient,
        regression: regression.map(RegressionSummary::from),
        generated_at: Utc::now().to_rfc3339(),
    }
}
