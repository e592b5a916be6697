//! Epitrend CLI
//!
//! Aggregates time-series datasets to monthly granularity, derives
//! period rates, and fits a cross-series regression.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use epitrend::aggregate::SeriesMode;
use epitrend::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_report_file,
    AnalyzeArgs, InputLayout,
};

/// Epitrend - monthly rate analysis for time-series datasets
#[derive(Parser, Debug)]
#[command(name = "epitrend")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reshape -> aggregate -> rates -> regression pipeline
    Analyze {
        /// Base-events table (local path or http(s) URL)
        #[arg(short, long)]
        base: String,

        /// Adverse-outcomes table (date-columns layout)
        #[arg(short, long)]
        adverse: Option<String>,

        /// Population table for rate denominators (optional)
        #[arg(short, long)]
        population: Option<String>,

        /// Input layout: date-columns or incident-rows
        #[arg(long, default_value = "date-columns")]
        layout: String,

        /// Identity columns forming the entity key (date-columns)
        #[arg(long, value_delimiter = ',', default_value = "Country/Region,Province/State")]
        identity_columns: Vec<String>,

        /// Metadata columns excluded from the melt (date-columns)
        #[arg(long, value_delimiter = ',', default_value = "Lat,Long")]
        skip_columns: Vec<String>,

        /// Incident identifier column (incident-rows)
        #[arg(long, default_value = "INCIDENT_KEY")]
        id_column: String,

        /// Occurrence date column (incident-rows)
        #[arg(long, default_value = "OCCUR_DATE")]
        date_column: String,

        /// Adverse-outcome flag column (incident-rows)
        #[arg(long, default_value = "STATISTICAL_MURDER_FLAG")]
        flag_column: String,

        /// Entity identifier column in the population table
        #[arg(long, default_value = "Combined_Key")]
        population_id_column: String,

        /// Population value column in the population table
        #[arg(long, default_value = "Population")]
        population_column: String,

        /// Series mode: cumulative, incremental, or new-from-cumulative
        #[arg(short, long, default_value = "cumulative")]
        mode: String,

        /// Dataset label for the report
        #[arg(short, long, default_value = "analysis")]
        label: String,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            base,
            adverse,
            population,
            layout,
            identity_columns,
            skip_columns,
            id_column,
            date_column,
            flag_column,
            population_id_column,
            population_column,
            mode,
            label,
            output,
            summary,
        } => {
            let layout: InputLayout = layout.parse().map_err(anyhow::Error::msg)?;
            let mode: SeriesMode = mode.parse().map_err(anyhow::Error::msg)?;

            let args = AnalyzeArgs {
                base_source: base,
                adverse_source: adverse,
                population_source: population,
                layout,
                identity_columns,
                skip_columns,
                id_column,
                date_column,
                flag_column,
                population_id_column,
                population_value_column: population_column,
                mode,
                dataset_label: label,
                output_json: output,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute analysis
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
