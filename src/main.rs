//! CLI entry point for the taxi trip table.
//!
//! Loads a trip CSV, derives distance and average speed, and prints one of
//! the temporal aggregates.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use taxi_trips::aggregate::{HourStep, Series};
use taxi_trips::output::{print_json, print_pretty, write_csv};
use taxi_trips::{LoadOptions, TripTable};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_trips")]
#[command(
    about = "Derive distance and speed features from taxi trips and aggregate them",
    long_about = None
)]
struct Cli {
    /// Read at most this many records
    #[arg(short = 'n', long, global = true)]
    rows: Option<usize>,

    /// Comma-separated list of columns to load
    #[arg(short, long, global = true, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the table shape and derived column statistics
    Summary {
        /// Trip CSV file (optionally .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Count trips by pickup day of week
    ByDow {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Count trips by pickup hour, in buckets of STEP hours
    ByHour {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Bucket width in hours, within ]0, 24]
        #[arg(short, long, default_value = "4")]
        step: HourStep,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Sum kilometres by pickup day of week
    KmByDow {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// How to emit the aggregate
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    format: Format,

    /// CSV file to write when the format is `csv`
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
    Csv,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_trips.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_trips.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let options = LoadOptions {
        row_limit: cli.rows,
        column_subset: cli.columns,
    };

    match cli.command {
        Commands::Summary { file } => {
            let table = TripTable::load(&file, &options)?;
            summarize(&table);
        }
        Commands::ByDow { file, output } => {
            let table = TripTable::load(&file, &options)?;
            emit(&table.trips_by_day_of_week(), &output)?;
        }
        Commands::ByHour { file, step, output } => {
            let table = TripTable::load(&file, &options)?;
            emit(&table.trips_by_hour_step(step)?, &output)?;
        }
        Commands::KmByDow { file, output } => {
            let table = TripTable::load(&file, &options)?;
            emit(&table.km_by_day_of_week()?, &output)?;
        }
    }

    Ok(())
}

/// Logs table shape and summary statistics of the derived columns.
fn summarize(table: &TripTable) {
    let (rows, columns) = table.shape();
    info!(rows, columns, names = ?table.columns(), "Table shape");

    if let Some(distances) = table.distances() {
        let total: f64 = distances.iter().filter(|d| d.is_finite()).sum();
        info!(total_km = total, mean_km = total / rows.max(1) as f64, "Distance");
    }

    if let Some(speeds) = table.avg_speeds() {
        let finite: Vec<f64> = speeds.iter().copied().filter(|s| s.is_finite()).collect();
        let non_finite = speeds.len() - finite.len();
        if non_finite > 0 {
            warn!(non_finite, "Trips with zero duration have a non-finite avg_speed");
        }
        let mean = finite.iter().sum::<f64>() / finite.len().max(1) as f64;
        info!(mean_kmh = mean, "Average speed");
    }

    for trip in table.iter().take(5) {
        debug!(?trip, "Sample record");
    }
}

fn emit<V>(series: &Series<V>, args: &OutputArgs) -> Result<()>
where
    V: Display + Serialize,
{
    match args.format {
        Format::Pretty => print_pretty(series),
        Format::Json => print_json(series)?,
        Format::Csv => {
            let Some(path) = args.output.as_deref() else {
                bail!("--output is required with --format csv");
            };
            write_csv(path, series)?;
            info!(path, name = series.name(), "Aggregate written");
        }
    }
    Ok(())
}
