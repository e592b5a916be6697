//! Display scale coefficient between two rate series.
//!
//! Brings two differently-scaled rate series into comparable range for
//! side-by-side presentation. The first element of the numerator series
//! is excluded from its max search: the earliest period typically has a
//! degenerate ratio from a tiny denominator. That exclusion is policy,
//! not an oversight.

use crate::utils::error::ScaleError;
use log::debug;

/// Compute the scale coefficient between two rate series
///
/// **Public** - main entry point
///
/// # Arguments
/// * `series_a` - Denominator series (e.g. event rates), nulls allowed
/// * `series_b` - Numerator series (e.g. adverse ratios), nulls allowed
///
/// # Returns
/// max(non-null of `series_b`, excluding its first element) /
/// max(non-null of `series_a`)
///
/// # Errors
/// * `ScaleError::DivisionUndefined` - `series_a` is all-null or its max
///   is not positive
/// * `ScaleError::EmptySeries` - `series_b` has no usable values past
///   its first element
pub fn compute_scale(
    series_a: &[Option<f64>],
    series_b: &[Option<f64>],
) -> Result<f64, ScaleError> {
    let max_a = max_non_null(series_a.iter())
        .ok_or_else(|| ScaleError::DivisionUndefined("series_a".to_string()))?;

    if max_a <= 0.0 {
        return Err(ScaleError::DivisionUndefined("series_a".to_string()));
    }

    let max_b = max_non_null(series_b.iter().skip(1))
        .ok_or_else(|| ScaleError::EmptySeries("series_b".to_string()))?;

    let coefficient = max_b / max_a;
    debug!(
        "Scale coefficient {} (max_b {} / max_a {})",
        coefficient, max_b, max_a
    );

    Ok(coefficient)
}

/// Maximum of the non-null values, if any
fn max_non_null<'a>(values: impl Iterator<Item = &'a Option<f64>>) -> Option<f64> {
    values
        .filter_map(|v| *v)
        .fold(None, |acc: Option<f64>, v| match acc {
            Some(m) => Some(m.max(v)),
            None => Some(v),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_scenario() {
        // Event rates [0.01, 0.02, 0.015]; adverse ratios [0.5, 0.1, 0.08]
        // with the first excluded -> max 0.1; coefficient = 0.1 / 0.02 = 5.0
        let a = vec![Some(0.01), Some(0.02), Some(0.015)];
        let b = vec![Some(0.5), Some(0.1), Some(0.08)];

        let coefficient = compute_scale(&a, &b).unwrap();
        assert!((coefficient - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_ignores_nulls() {
        let a = vec![None, Some(0.02)];
        let b = vec![Some(9.0), None, Some(0.04)];

        let coefficient = compute_scale(&a, &b).unwrap();
        assert!((coefficient - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_all_null_denominator() {
        let a: Vec<Option<f64>> = vec![None, None];
        let b = vec![Some(0.5), Some(0.1)];
        assert!(matches!(
            compute_scale(&a, &b),
            Err(ScaleError::DivisionUndefined(_))
        ));
    }

    #[test]
    fn test_scale_zero_denominator_max() {
        let a = vec![Some(0.0), Some(-1.0)];
        let b = vec![Some(0.5), Some(0.1)];
        assert!(matches!(
            compute_scale(&a, &b),
            Err(ScaleError::DivisionUndefined(_))
        ));
    }

    #[test]
    fn test_scale_numerator_only_first_element() {
        // Only the excluded first element is non-null
        let a = vec![Some(0.01)];
        let b = vec![Some(0.5)];
        assert!(matches!(
            compute_scale(&a, &b),
            Err(ScaleError::EmptySeries(_))
        ));
    }
}
