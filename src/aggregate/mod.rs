//! Aggregation of long records into monthly buckets and derived rates.
//!
//! This module transforms normalized long records into:
//! - Monthly buckets (per-series, mode-aware folding)
//! - Period-over-period rate records with guarded division
//! - A display scale coefficient between two rate series

pub mod monthly;
pub mod rates;
pub mod scale;

// Re-export main types and functions
pub use monthly::{accumulate, aggregate_monthly, month_start, MonthlyBucket, SeriesMode};
pub use rates::{derive_rates, RateRecord};
pub use scale::compute_scale;
