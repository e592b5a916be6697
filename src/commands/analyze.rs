//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the input tables (local path or URL)
//! 2. Reshapes them into long records
//! 3. Aggregates to monthly buckets
//! 4. Derives rate records and the scale coefficient
//! 5. Fits the cross-series regression
//! 6. Writes the report

use crate::aggregate::{
    accumulate, aggregate_monthly, compute_scale, derive_rates, MonthlyBucket, RateRecord,
    SeriesMode,
};
use crate::output::write_report;
use crate::regression::{fit, RegressionResult};
use crate::report::build_report;
use crate::table::{load_table, reshape, reshape_events, sum_population, ValueKind};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Which physical layout the input tables use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// One value column per calendar date; separate base and adverse
    /// tables (e.g. confirmed cases and deaths)
    DateColumns,

    /// One row per incident with a date column and an adverse-outcome
    /// flag column; a single table carries both series
    IncidentRows,
}

impl InputLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputLayout::DateColumns => "date-columns",
            InputLayout::IncidentRows => "incident-rows",
        }
    }
}

impl std::str::FromStr for InputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-columns" => Ok(InputLayout::DateColumns),
            "incident-rows" => Ok(InputLayout::IncidentRows),
            other => Err(format!(
                "Unknown input layout '{}' (expected date-columns or incident-rows)",
                other
            )),
        }
    }
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Base-events table: local path or http(s) URL
    pub base_source: String,

    /// Adverse-outcomes table (date-columns layout only)
    pub adverse_source: Option<String>,

    /// Optional population table for rate denominators
    pub population_source: Option<String>,

    /// Physical layout of the input tables
    pub layout: InputLayout,

    /// Identity columns forming the entity key (date-columns layout)
    pub identity_columns: Vec<String>,

    /// Metadata columns excluded from the melt (date-columns layout)
    pub skip_columns: Vec<String>,

    /// Incident identifier column (incident-rows layout)
    pub id_column: String,

    /// Occurrence date column (incident-rows layout)
    pub date_column: String,

    /// Adverse-outcome flag column (incident-rows layout)
    pub flag_column: String,

    /// Entity identifier column in the population table
    pub population_id_column: String,

    /// Population value column in the population table
    pub population_value_column: String,

    /// How daily totals fold into months
    pub mode: SeriesMode,

    /// Human-readable dataset label for the report
    pub dataset_label: String,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            base_source: String::new(),
            adverse_source: None,
            population_source: None,
            layout: InputLayout::DateColumns,
            identity_columns: vec!["Country/Region".to_string(), "Province/State".to_string()],
            skip_columns: vec!["Lat".to_string(), "Long".to_string()],
            id_column: "INCIDENT_KEY".to_string(),
            date_column: "OCCUR_DATE".to_string(),
            flag_column: "STATISTICAL_MURDER_FLAG".to_string(),
            population_id_column: "Combined_Key".to_string(),
            population_value_column: "Population".to_string(),
            mode: SeriesMode::Cumulative,
            dataset_label: "analysis".to_string(),
            output_json: PathBuf::from("report.json"),
            print_summary: false,
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// Ok if the report was written, Err with context if any stage fails
///
/// # Errors
/// * Dataset load/parse failures
/// * Schema violations (missing columns, unparseable dates, duplicates)
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    info!("Starting analysis: {}", args.dataset_label);
    info!("Base source: {}", args.base_source);

    // Incident rows always aggregate as per-period sums; the configured
    // mode only applies to date-column inputs.
    let mode = match args.layout {
        InputLayout::DateColumns => args.mode,
        InputLayout::IncidentRows => SeriesMode::Incremental,
    };

    // Step 1+2: Load and reshape per layout
    let (base_buckets, adverse_buckets) = match args.layout {
        InputLayout::DateColumns => load_date_column_series(&args, mode)?,
        InputLayout::IncidentRows => load_incident_series(&args)?,
    };

    info!(
        "Step 3/6: Aggregated {} base periods, {} adverse periods",
        base_buckets.len(),
        adverse_buckets.len()
    );

    // Optional population denominator
    let population = load_population(&args)?;

    // Rate derivation needs running cumulative series; incremental
    // modes produce per-period values, so accumulate them first.
    let (base_cumulative, adverse_cumulative) = match mode {
        SeriesMode::Cumulative => (base_buckets.clone(), adverse_buckets.clone()),
        _ => (accumulate(&base_buckets), accumulate(&adverse_buckets)),
    };

    // Step 4: Rates and scale coefficient
    info!("Step 4/6: Deriving period rates...");
    let rates = derive_rates(&base_cumulative, &adverse_cumulative, population);

    let scale_coefficient = compute_scale_for_display(&rates);

    // Step 5: Cross-series regression (new base events predicting new
    // adverse outcomes)
    info!("Step 5/6: Fitting cross-series regression...");
    let regression = fit_cross_series(&rates);

    // Step 6: Write output
    info!("Step 6/6: Writing report...");
    let report = build_report(
        &args.dataset_label,
        mode,
        population,
        &base_cumulative,
        &adverse_cumulative,
        &rates,
        scale_coefficient,
        regression.as_ref(),
    );

    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        print_summary(&args, &base_cumulative, &rates, &regression, scale_coefficient);
    }

    Ok(())
}

/// Load and aggregate the two date-column tables
///
/// **Private** - internal helper for execute_analyze
fn load_date_column_series(
    args: &AnalyzeArgs,
    mode: SeriesMode,
) -> Result<(Vec<MonthlyBucket>, Vec<MonthlyBucket>)> {
    let adverse_source = args
        .adverse_source
        .as_deref()
        .context("date-columns layout requires an adverse-outcomes table")?;

    info!("Step 1/6: Loading input tables...");
    let base_table = load_table(&args.base_source).context("Failed to load base-events table")?;
    let adverse_table = load_table(adverse_source).context("Failed to load adverse-outcomes table")?;

    let identity: Vec<&str> = args.identity_columns.iter().map(String::as_str).collect();
    let skip: Vec<&str> = args.skip_columns.iter().map(String::as_str).collect();

    info!("Step 2/6: Reshaping wide tables...");
    let base_records = reshape(&base_table, &identity, &skip, ValueKind::Cases)
        .context("Failed to reshape base-events table")?;
    let adverse_records = reshape(&adverse_table, &identity, &skip, ValueKind::Deaths)
        .context("Failed to reshape adverse-outcomes table")?;

    debug!(
        "Reshaped {} base records, {} adverse records",
        base_records.len(),
        adverse_records.len()
    );

    let base = aggregate_monthly(&base_records, ValueKind::Cases, mode)
        .context("Failed to aggregate base-events series")?;
    let adverse = aggregate_monthly(&adverse_records, ValueKind::Deaths, mode)
        .context("Failed to aggregate adverse-outcomes series")?;

    Ok((base, adverse))
}

/// Load and aggregate a single incident-rows table
///
/// **Private** - internal helper for execute_analyze
fn load_incident_series(args: &AnalyzeArgs) -> Result<(Vec<MonthlyBucket>, Vec<MonthlyBucket>)> {
    info!("Step 1/6: Loading incident table...");
    let table = load_table(&args.base_source).context("Failed to load incident table")?;

    info!("Step 2/6: Reshaping incident rows...");
    let records = reshape_events(&table, &args.id_column, &args.date_column, &args.flag_column)
        .context("Failed to reshape incident table")?;

    debug!("Reshaped {} incident records", records.len());

    // Incident rows are per-event observations; both series aggregate
    // as per-period sums regardless of the configured mode.
    let base = aggregate_monthly(&records, ValueKind::IncidentCount, SeriesMode::Incremental)
        .context("Failed to aggregate incident counts")?;
    let adverse = aggregate_monthly(&records, ValueKind::MurderFlag, SeriesMode::Incremental)
        .context("Failed to aggregate adverse-outcome flags")?;

    Ok((base, adverse))
}

/// Load the deduplicated population total, if a source was given
///
/// **Private** - internal helper for execute_analyze
fn load_population(args: &AnalyzeArgs) -> Result<Option<f64>> {
    let Some(source) = args.population_source.as_deref() else {
        return Ok(None);
    };

    let table = load_table(source).context("Failed to load population table")?;
    let total = sum_population(
        &table,
        &args.population_id_column,
        &args.population_value_column,
    )
    .context("Failed to sum population table")?;

    info!("Population denominator: {}", total);

    Ok(Some(total))
}

/// Scale coefficient between event rates and adverse ratios
///
/// **Private** - a scale that cannot be computed (all-null rates) is a
/// warning, not a failed run; the report field stays null
fn compute_scale_for_display(rates: &[RateRecord]) -> Option<f64> {
    let event_rates: Vec<Option<f64>> = rates.iter().map(|r| r.event_rate).collect();
    let adverse_ratios: Vec<Option<f64>> = rates.iter().map(|r| r.adverse_ratio).collect();

    match compute_scale(&event_rates, &adverse_ratios) {
        Ok(coefficient) => Some(coefficient),
        Err(e) => {
            warn!("Scale coefficient unavailable: {}", e);
            None
        }
    }
}

/// Regression of new adverse outcomes on new base events
///
/// **Private** - insufficient joined periods is a warning, not a failed
/// run; no fallback fit is produced
fn fit_cross_series(rates: &[RateRecord]) -> Option<RegressionResult> {
    let x: Vec<_> = rates.iter().map(|r| (r.period_start, r.new_base)).collect();
    let y: Vec<_> = rates
        .iter()
        .map(|r| (r.period_start, r.new_adverse))
        .collect();

    match fit(&x, &y) {
        Ok(result) => {
            debug!(
                "Fit: slope {:.4}, intercept {:.4}, r2 {:.4}",
                result.slope, result.intercept, result.r_squared
            );
            Some(result)
        }
        Err(e) => {
            warn!("Regression unavailable: {}", e);
            None
        }
    }
}

/// Print the text summary block
///
/// **Private** - internal helper for execute_analyze
fn print_summary(
    args: &AnalyzeArgs,
    base: &[MonthlyBucket],
    rates: &[RateRecord],
    regression: &Option<RegressionResult>,
    scale_coefficient: Option<f64>,
) {
    println!("\n{}", "=".repeat(80));
    println!("ANALYSIS SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Dataset:  {}", args.dataset_label);
    println!("Layout:   {}", args.layout.as_str());
    println!("Periods:  {}", base.len());
    if let Some(last) = base.last() {
        println!("Total base events: {}", last.value);
    }
    if let Some(last) = rates.last() {
        if let Some(ratio) = last.cumulative_ratio {
            println!("Final cumulative ratio: {:.4}", ratio);
        }
    }
    if let Some(coefficient) = scale_coefficient {
        println!("Scale coefficient: {:.4}", coefficient);
    }
    if let Some(result) = regression {
        println!(
            "Regression: slope {:.4} (p {:.4}), intercept {:.4} (p {:.4}), r2 {:.4}",
            result.slope,
            result.p_value_slope,
            result.intercept,
            result.p_value_intercept,
            result.r_squared
        );
    }
    println!("{}", "=".repeat(80));
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.base_source.is_empty() {
        anyhow::bail!("Base source cannot be empty");
    }

    if args.layout == InputLayout::DateColumns {
        if args.adverse_source.is_none() {
            anyhow::bail!("date-columns layout requires --adverse");
        }
        if args.identity_columns.is_empty() {
            anyhow::bail!("date-columns layout requires at least one identity column");
        }
    }

    if args.dataset_label.is_empty() {
        anyhow::bail!("Dataset label cannot be empty");
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_valid() {
        let args = AnalyzeArgs {
            base_source: "cases.csv".to_string(),
            adverse_source: Some("deaths.csv".to_string()),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_empty_base() {
        let args = AnalyzeArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_missing_adverse() {
        let args = AnalyzeArgs {
            base_source: "cases.csv".to_string(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_incident_rows_single_source() {
        let args = AnalyzeArgs {
            base_source: "incidents.csv".to_string(),
            layout: InputLayout::IncidentRows,
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_no_identity_columns() {
        let args = AnalyzeArgs {
            base_source: "cases.csv".to_string(),
            adverse_source: Some("deaths.csv".to_string()),
            identity_columns: vec![],
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_input_layout_from_str() {
        assert_eq!(
            "incident-rows".parse::<InputLayout>().unwrap(),
            InputLayout::IncidentRows
        );
        assert!("wide".parse::<InputLayout>().is_err());
    }
}
