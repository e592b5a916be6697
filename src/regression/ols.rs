//! Ordinary least-squares fit between two monthly series.
//!
//! Series are inner-joined on period start: a period present in only
//! one series is silently dropped, never imputed. The fit is the
//! closed-form solution of the normal equations on centered sums.

use super::tdist::two_tailed_p;
use crate::utils::config::MIN_FIT_POINTS;
use crate::utils::error::RegressionError;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

/// Result of an OLS fit: dependent = intercept + slope * independent
#[derive(Debug, Clone)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,

    /// Standard errors of the coefficients
    pub slope_std_err: f64,
    pub intercept_std_err: f64,

    /// Two-tailed p-values against t with n-2 degrees of freedom
    pub p_value_slope: f64,
    pub p_value_intercept: f64,

    /// 1 - SS_residual / SS_total
    pub r_squared: f64,

    /// Number of joined periods the fit used
    pub n_observations: usize,

    /// Joined periods, in independent-series order
    pub periods: Vec<NaiveDate>,

    /// intercept + slope * x for every joined period, same order
    pub fitted_values: Vec<f64>,
}

/// Fit an OLS line between two period-keyed series
///
/// **Public** - main entry point for the regression stage
///
/// # Arguments
/// * `independent` - (period_start, value) pairs, chronological
/// * `dependent` - (period_start, value) pairs, chronological
///
/// # Returns
/// Fit coefficients with standard errors, p-values, r-squared, and
/// fitted values for every joined period
///
/// # Errors
/// * `RegressionError::InsufficientData` - fewer than 3 joined periods
/// * `RegressionError::DegenerateVariance` - independent series has
///   zero variance across the joined periods
pub fn fit(
    independent: &[(NaiveDate, f64)],
    dependent: &[(NaiveDate, f64)],
) -> Result<RegressionResult, RegressionError> {
    let dependent_by_period: HashMap<NaiveDate, f64> = dependent.iter().copied().collect();

    // Inner join, keeping the independent series' order
    let mut periods = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (period, x) in independent {
        if let Some(y) = dependent_by_period.get(period) {
            periods.push(*period);
            xs.push(*x);
            ys.push(*y);
        }
    }

    let n = xs.len();
    debug!(
        "Joined {} of {}/{} periods for fit",
        n,
        independent.len(),
        dependent.len()
    );

    if n < MIN_FIT_POINTS {
        return Err(RegressionError::InsufficientData {
            required: MIN_FIT_POINTS,
            found: n,
        });
    }

    let n_f = n as f64;
    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        sum_xx += dx * dx;
        sum_xy += dx * (ys[i] - mean_y);
    }

    if sum_xx <= 0.0 {
        return Err(RegressionError::DegenerateVariance);
    }

    let slope = sum_xy / sum_xx;
    let intercept = mean_y - slope * mean_x;

    let fitted_values: Vec<f64> = xs.iter().map(|x| intercept + slope * x).collect();

    let ss_residual: f64 = ys
        .iter()
        .zip(&fitted_values)
        .map(|(y, f)| (y - f) * (y - f))
        .sum();
    let ss_total: f64 = ys.iter().map(|y| (y - mean_y) * (y - mean_y)).sum();

    let r_squared = if ss_total > 0.0 {
        1.0 - ss_residual / ss_total
    } else if ss_residual <= f64::EPSILON {
        // Constant dependent series fit exactly by a flat line
        1.0
    } else {
        0.0
    };

    let df = n_f - 2.0;
    let residual_std = (ss_residual / df).sqrt();
    let slope_std_err = residual_std / sum_xx.sqrt();
    let intercept_std_err = residual_std * (1.0 / n_f + mean_x * mean_x / sum_xx).sqrt();

    let p_value_slope = coefficient_p_value(slope, slope_std_err, df);
    let p_value_intercept = coefficient_p_value(intercept, intercept_std_err, df);

    Ok(RegressionResult {
        slope,
        intercept,
        slope_std_err,
        intercept_std_err,
        p_value_slope,
        p_value_intercept,
        r_squared,
        n_observations: n,
        periods,
        fitted_values,
    })
}

/// Two-tailed p-value for one coefficient
///
/// **Private** - a zero standard error (perfect fit) degenerates to
/// p = 0 for a nonzero coefficient and p = 1 for a zero one
fn coefficient_p_value(coefficient: f64, std_err: f64, df: f64) -> f64 {
    if std_err > 0.0 {
        two_tailed_p(coefficient / std_err, df)
    } else if coefficient.abs() > 0.0 {
        0.0
    } else {
        1.0
    }
}
