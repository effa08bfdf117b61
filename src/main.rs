//! Index volatility - main entry point
//!
//! This binary provides two subcommands:
//! - instruments: List the instrument catalog
//! - analyze: Run the volatility pipeline for one instrument

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "index-volatility")]
#[command(about = "Rolling volatility analyzer for Nifty 50 and Bank Nifty stocks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available instruments and their tickers
    Instruments,

    /// Compute and chart rolling volatility for one instrument
    Analyze {
        /// Instrument display name, e.g. "TCS" or "HDFC Bank"
        #[arg(short, long)]
        instrument: String,

        /// Start date (YYYY-MM-DD), defaults to 2022-01-01
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD, exclusive), defaults to today
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Rolling window in trading days (overrides config)
        #[arg(short, long)]
        window: Option<usize>,

        /// Read bars from a CSV file instead of the market data provider
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the chart payload as JSON
        #[arg(long)]
        json: bool,

        /// Write the chart as SVG to this path
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Default filter: `info` (or `debug`), with chatty HTTP crates held at `warn`
fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    )
}

/// File layer always, stderr layer only when `console` is set
fn log_subscriber(
    verbose: bool,
    log_dir: &Path,
    log_filename: &str,
    console: bool,
) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::never(log_dir, log_filename))
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    let log_dir = Path::new("logs");
    std::fs::create_dir_all(log_dir)?;

    // {command}_{timestamp}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );

    // stdout is reserved for command output when file_only is set
    log_subscriber(verbose, log_dir, &log_filename, !file_only).init();

    debug!("Log file: {}", log_dir.join(&log_filename).display());
    Ok(())
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let (command_name, file_only) = match &cli.command {
        Commands::Instruments => ("instruments", true),
        Commands::Analyze { json, .. } => ("analyze", *json),
    };

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Instruments => commands::instruments::run(),

        Commands::Analyze {
            instrument,
            start,
            end,
            window,
            csv,
            json,
            svg,
            config,
        } => commands::analyze::run(commands::analyze::AnalyzeArgs {
            instrument,
            start,
            end,
            window,
            csv,
            json,
            svg,
            config,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(false).starts_with("info,"));
        assert!(default_filter(true).starts_with("debug,"));
        assert!(default_filter(true).contains("reqwest=warn"));
    }

    #[test]
    fn test_log_subscriber_writes_file_with_and_without_console() {
        let dir = tempfile::tempdir().unwrap();

        for (console, name) in [(true, "with_console.log"), (false, "file_only.log")] {
            let subscriber = log_subscriber(false, dir.path(), name, console);
            tracing::subscriber::with_default(subscriber, || {
                tracing::error!("volatility run failed");
            });

            let contents = std::fs::read_to_string(dir.path().join(name)).unwrap();
            assert!(contents.contains("volatility run failed"), "{}", name);
        }
    }
}
