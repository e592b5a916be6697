use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Dataset: {}", report.dataset);
    println!("  Mode: {}", report.mode);
    println!("  Periods: {}", report.base_series.len());
    println!("  Rate records: {}", report.rates.len());
    println!(
        "  Regression: {}",
        if report.regression.is_some() {
            "present"
        } else {
            "absent"
        }
    );

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Epitrend Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string           - Schema version (e.g., '1.0.0')");
        println!("  dataset: string           - Dataset label");
        println!("  mode: string              - Series mode used for aggregation");
        println!("  population: number?       - Rate denominator, if supplied");
        println!("  base_series: array        - Monthly base-event buckets");
        println!("    period_start: string    - First day of month (ISO date)");
        println!("    value: number           - Cumulative value at period end");
        println!("  adverse_series: array     - Monthly adverse-outcome buckets");
        println!("  rates: array              - Per-period rate statistics");
        println!("    new_base: number        - New base events (signed)");
        println!("    event_rate: number?     - Null when denominator non-positive");
        println!("    adverse_ratio: number?  - Null when denominator non-positive");
        println!("    cumulative_ratio: number? - Null when denominator non-positive");
        println!("  scale_coefficient: number? - Display scale between rate series");
        println!("  regression: object?       - Cross-series OLS fit");
        println!("    slope, intercept        - Coefficients");
        println!("    p_value_slope, p_value_intercept - Two-tailed, t with n-2 df");
        println!("    r_squared: number       - 1 - SS_res/SS_tot");
        println!("    fitted: array           - Fitted value per joined period");
        println!("  generated_at: string      - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Epitrend v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Monthly aggregation and rate regression for time-series datasets.");
}
