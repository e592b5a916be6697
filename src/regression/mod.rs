//! Ordinary least-squares regression between aggregated series.
//!
//! This module handles:
//! - Inner-joining two period-keyed series
//! - The closed-form OLS fit with coefficient standard errors
//! - Two-tailed t-distribution p-values

pub mod ols;
pub mod tdist;

// Re-export main types and functions
pub use ols::{fit, RegressionResult};
pub use tdist::two_tailed_p;
