use cashflow_forecast::{CashflowForecaster, ForecastConfig, ForecastError, ForecastReport};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full report: history, scenarios and risk metrics
    Json,
    /// Forecast table only
    Csv,
}

/// Forecast monthly net cash flow from a transaction CSV
#[derive(Debug, Parser)]
#[command(name = "cashflow-forecast", version, about)]
struct Cli {
    /// CSV file with date, inflow and outflow columns
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of months to forecast (overrides the configuration)
    #[arg(long)]
    horizon: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_report<W: Write>(report: &ForecastReport, format: OutputFormat, mut writer: W) -> Result<(), ForecastError> {
    match format {
        OutputFormat::Json => {
            writer.write_all(report.to_json_pretty()?.as_bytes())?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => report.write_forecast_csv(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), ForecastError> {
    let mut config = ForecastConfig::load_or_default(cli.config.as_deref())?;
    if let Some(horizon) = cli.horizon {
        config = config.with_horizon(horizon);
    }

    let forecaster = CashflowForecaster::new(config)?;
    let report = forecaster.forecast_csv(&cli.input)?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)?;
            write_report(&report, cli.format, BufWriter::new(file))?;
            info!(path = %path.display(), "report written");
        }
        None => write_report(&report, cli.format, io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(input = %cli.input.display(), "forecast failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
