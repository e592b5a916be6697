//! Epitrend
//!
//! Monthly aggregation and rate regression for epidemiological and
//! incident time-series datasets.
//!
//! This crate provides the core implementation for the `epitrend`
//! CLI tool: reshaping wide per-date-column tables into long records,
//! aggregating them to monthly buckets, deriving period-over-period
//! rates with guarded division, and fitting an ordinary least-squares
//! line between two aggregated series.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install epitrend
//! epitrend --help
//! ```

pub mod aggregate;
pub mod commands;
pub mod fetch;
pub mod output;
pub mod regression;
pub mod report;
pub mod table;
pub mod utils;
