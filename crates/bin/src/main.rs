//! yieldsift CLI binary.
//!
//! Runs the screener pipeline from the command line.

mod logging;

use clap::{Parser, Subcommand};
use logging::{LogFormat, init_logging};
use std::path::PathBuf;
use std::process;
use yieldsift::output::{ExportFormat, guide_to_ascii_table, table_summary_to_ascii};
use yieldsift::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "yieldsift")]
#[command(
    about = "Market-cap weights and a low dividend yield guide from a stock screener export",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Weight the screener, build the guide and write both reports
    Run {
        /// Screener export (CSV); overrides the configuration file
        input: Option<PathBuf>,

        /// Keep securities yielding strictly less than this fraction (0.005 = 0.5%)
        #[arg(long)]
        threshold: Option<f64>,

        /// Directory for the reports
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Report format (csv, json or pretty-json)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// JSON configuration file; flags take precedence
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and clean a screener export and print its summary
    Inspect {
        /// Screener export (CSV)
        input: PathBuf,

        /// JSON configuration file for loader options
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        if let Some(err) = e.downcast_ref::<yieldsift::Error>()
            && err.kind().is_retryable()
        {
            eprintln!("Hint: close the report in the program holding it open and run again.");
        }
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            input,
            threshold,
            output_dir,
            format,
            config,
        } => {
            let mut config = load_config(config)?;
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(threshold) = threshold {
                config.yield_threshold = threshold;
            }
            if let Some(output_dir) = output_dir {
                config.output_directory = output_dir;
            }
            if let Some(format) = format {
                config.format = format;
            }
            run_pipeline(config)?;
        }
        Commands::Inspect { input, config } => {
            let mut config = load_config(config)?;
            config.input_path = input;
            inspect(config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig, yieldsift::Error> {
    path.map_or_else(
        || Ok(PipelineConfig::default()),
        |path| PipelineConfig::from_json_file(&path),
    )
}

fn run_pipeline(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = config.input_path.display().to_string();
    let outcome = Pipeline::new(config)?.run()?;

    print!("{}", table_summary_to_ascii(&outcome.summary, &source));
    print!("{}", guide_to_ascii_table(&outcome.guide)?);

    println!("\nReports written:");
    println!("  Full:  {}", outcome.reports.full_report.display());
    println!("  Guide: {}", outcome.reports.guide_report.display());

    Ok(())
}

fn inspect(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = config.input_path.display().to_string();
    let summary = Pipeline::new(config)?.inspect()?;
    print!("{}", table_summary_to_ascii(&summary, &source));
    Ok(())
}
