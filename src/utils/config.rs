//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default timeout for dataset downloads
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Minimum joined periods for a two-parameter fit with residual
/// degrees of freedom
pub const MIN_FIT_POINTS: usize = 3;

// Date formats accepted for date column labels and date cells
// (ISO, plus the short/long US forms the source datasets use)
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

// Accepted spellings for boolean flag cells (e.g. murder flags)
pub const TRUE_FLAGS: &[&str] = &["true", "TRUE", "True", "Y", "y", "1"];
pub const FALSE_FLAGS: &[&str] = &["false", "FALSE", "False", "N", "n", "0", ""];
