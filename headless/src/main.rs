use clap::{Parser, Subcommand};
use erosion_risk_core::report::{annual_maxima, parse_events, parse_soil_loss_report};
use erosion_risk_core::risk::{RiskAggregator, RECOVERY};
use erosion_risk_core::scenario::RepresentativeYear;
use erosion_risk_core::{
    BurnSeverity, EngineConfig, PeakIntensity, ReportOptions, Result, RiskError, ScenarioSpace, TaggedEvent,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Post-fire erosion risk tools over simulator output
#[derive(Parser, Debug)]
#[command(name = "erosion-risk")]
#[command(about = "Parse WEPP output and build post-fire erosion risk curves", long_about = None)]
struct Args {
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an annual soil-loss report
    Report {
        /// Report file
        file: PathBuf,

        /// Hillslope length in metres (per-area sediment yield)
        #[arg(short, long)]
        slope_length: Option<f64>,

        /// Simulated road width in metres (adds road-prism erosion)
        #[arg(short, long)]
        road_width: Option<f64>,
    },

    /// Parse an event-by-event log into annual maxima
    Events {
        /// Event-by-event log
        file: PathBuf,

        /// JSON list of daily peak intensities to join
        #[arg(long)]
        peaks: Option<PathBuf>,
    },

    /// Build risk curves from tagged scenario results
    Aggregate {
        /// JSON object with `years` and `sed_results`
        file: PathBuf,

        /// Burn severity class (High, Moderate, Low, Unburned)
        #[arg(short, long, default_value = "High")]
        severity: BurnSeverity,

        /// Substitute the monsoon recovery row
        #[arg(short, long)]
        monsoon: bool,
    },
}

/// Input of the `aggregate` command
#[derive(Debug, Deserialize)]
struct AggregateInput {
    years: Vec<RepresentativeYear>,
    sed_results: Vec<TaggedEvent>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RiskError::io(path, e))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    serde_json::from_str(&read(path)?).map_err(|e| RiskError::InvalidRequest(format!("{}: {e}", path.display())))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| RiskError::InvalidRequest(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match args.command {
        Command::Report {
            file,
            slope_length,
            road_width,
        } => {
            let options = ReportOptions {
                slope_length_m: slope_length,
                road_width_m: road_width,
                return_intervals: config.return_intervals,
            };
            let report = parse_soil_loss_report(&read(&file)?, &options)?;
            info!(file = %file.display(), detailed = report.annuals().is_some(), "parsed report");
            print_json(&report, args.pretty)
        }
        Command::Events { file, peaks } => {
            let events = parse_events(&read(&file)?)?;
            let peaks: Option<Vec<PeakIntensity>> = peaks.as_deref().map(read_json).transpose()?;
            let maxima = annual_maxima(&events, peaks.as_deref());
            info!(
                file = %file.display(),
                events = events.len(),
                years = maxima.num_years_with_runoff_event,
                "parsed event log"
            );
            print_json(&maxima, args.pretty)
        }
        Command::Aggregate {
            file,
            severity,
            monsoon,
        } => {
            let input: AggregateInput = read_json(&file)?;
            let aggregator = RiskAggregator::new(ScenarioSpace::for_severity(severity), &RECOVERY, monsoon);
            let curves = aggregator.aggregate(&input.years, &input.sed_results);
            info!(%severity, events = input.sed_results.len(), monsoon, "aggregated");
            print_json(&curves, args.pretty)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
