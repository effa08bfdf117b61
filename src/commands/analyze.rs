//! Analyze command implementation

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use index_volatility::chart::svg;
use index_volatility::data::{CsvDataSource, MarketDataSource, YahooDataFetcher};
use index_volatility::{
    Catalog, Config, DateRange, PipelineError, Severity, VolatilityAnalyzer, VolatilityReport,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

pub struct AnalyzeArgs {
    pub instrument: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub window: Option<usize>,
    pub csv: Option<PathBuf>,
    pub json: bool,
    pub svg: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> Result<ExitCode> {
    info!("Starting volatility analysis");

    let mut config = Config::load(args.config.as_ref())?;
    if let Some(window) = args.window {
        info!("Overriding window to: {}", window);
        config.analysis.window = window;
    }
    debug!("Config: {:?}", config);

    let range = DateRange::new(
        args.start.unwrap_or(config.analysis.default_start),
        args.end.unwrap_or_else(|| Local::now().date_naive()),
    );

    let catalog = Catalog::combined();
    let source: Box<dyn MarketDataSource> = match &args.csv {
        Some(path) => Box::new(CsvDataSource::new(path)),
        None => Box::new(YahooDataFetcher::new(&config.provider)?),
    };

    let analyzer = VolatilityAnalyzer::new(&catalog, source.as_ref())
        .with_window(config.analysis.window)
        .with_threshold_quantile(config.analysis.threshold_quantile);

    let report = match analyzer.analyze(&args.instrument, range) {
        Ok(report) => report,
        Err(e) => return Ok(report_failure(&e)),
    };

    if let Some(path) = &args.svg {
        let document = svg::draw(&report.chart, (config.chart.width, config.chart.height))?;
        fs::write(path, document)
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        info!("Chart written to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.chart)?);
    } else {
        print_summary(&report);
    }

    info!("Analysis completed successfully");
    Ok(ExitCode::SUCCESS)
}

fn report_failure(error: &PipelineError) -> ExitCode {
    match error.severity() {
        Severity::Error => {
            eprintln!("ERROR: {}", error);
            ExitCode::from(1)
        }
        Severity::Warning => {
            eprintln!("WARNING: {}", error);
            ExitCode::from(2)
        }
    }
}

fn print_summary(report: &VolatilityReport) {
    let chart = &report.chart;

    println!("\n{}", "=".repeat(60));
    println!("{}", chart.subtitle.to_uppercase());
    println!("{}", "=".repeat(60));
    println!("Ticker:             {}", report.instrument.ticker);
    println!("Date Range:         {} to {}", report.range.start, report.range.end);
    println!("Rows Fetched:       {}", report.raw_rows);
    println!("Clean Bars:         {}", report.bars);
    println!("Window:             {}", report.series.window);
    println!("Defined Points:     {}", chart.line.points.len());
    println!(
        "{}:  {:.6} (q={:.2})",
        chart.threshold.name, chart.threshold.y, chart.threshold.quantile
    );
    if let Some(latest) = report.latest() {
        let flag = if report.is_high_volatility() { "  << HIGH" } else { "" };
        println!("Latest Volatility:  {:.6}{}", latest, flag);
    }
    println!("{}", "=".repeat(60));

    println!("\nRECENT:");
    let recent = chart.line.points.len().saturating_sub(10);
    for point in &chart.line.points[recent..] {
        println!("{}  {:.6}", point.date, point.value);
    }
}
