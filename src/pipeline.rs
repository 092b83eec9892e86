//! The four pipelines. Each takes its inputs explicitly and runs top to bottom.

use crate::config::{AnalysisConfig, ProviderKind};
use crate::presenter;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenario_forecast::analysis::analyze;
use scenario_forecast::cleaning::{clean, forward_fill};
use scenario_forecast::data::Bar;
use scenario_forecast::frame::CombinedFrame;
use scenario_forecast::metrics::{evaluate_model, EvaluationReport};
use scenario_forecast::models::{AdditiveDecomposition, ForecastModel, TrainedForecastModel};
use scenario_forecast::providers::{
    CsvDirectoryProvider, MarketDataProvider, ValuationProvider, YahooProvider,
};
use scenario_forecast::scenario::Scenario;
use scenario_forecast::simulation::simulate_scenarios;
use scenario_forecast::snapshot::{read_snapshot, write_snapshot};
use scenario_forecast::valuation::ValuationComparison;
use serde::Serialize;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Future rows shown per forecast table
const FORECAST_TABLE_ROWS: usize = 12;
/// Trailing rows shown per moving-average table
const MOVING_AVERAGE_TABLE_ROWS: usize = 10;

/// Price history and valuation ratios from one place
pub trait MarketSource: MarketDataProvider + ValuationProvider {}

impl<T: MarketDataProvider + ValuationProvider> MarketSource for T {}

/// Provider selected by the configuration
pub fn build_source(config: &AnalysisConfig) -> Result<Box<dyn MarketSource>> {
    match config.provider.kind {
        ProviderKind::Yahoo => Ok(Box::new(
            YahooProvider::new(config.provider.timeout()).context("Failed to build HTTP client")?,
        )),
        ProviderKind::Csv => {
            let Some(dir) = &config.provider.data_dir else {
                bail!("The csv provider needs a data directory");
            };
            Ok(Box::new(CsvDirectoryProvider::new(dir)))
        }
    }
}

/// What a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub frame: CombinedFrame,
    /// Tickers that returned no history
    pub skipped: Vec<String>,
    /// Dates removed from the analysis set as outliers
    pub outlier_rows: usize,
    pub valuation: ValuationComparison,
}

/// Fetch every ticker, write the snapshot, then report on the cleaned data
pub fn run_crawl<S, W>(config: &AnalysisConfig, source: &S, out: &mut W) -> Result<CrawlOutcome>
where
    S: MarketSource + ?Sized,
    W: Write + ?Sized,
{
    let mut histories: Vec<(String, Vec<Bar>)> = Vec::new();
    let mut skipped = Vec::new();

    for ticker in config.normalized_tickers() {
        info!(ticker = %ticker, start = %config.start, end = %config.end, "fetching history");
        let bars = source
            .daily_history(&ticker, config.start, config.end)
            .with_context(|| format!("Failed to fetch history for {}", ticker))?;
        if bars.is_empty() {
            warn!(ticker = %ticker, "no data available, skipping");
            skipped.push(ticker);
            continue;
        }
        histories.push((ticker, bars));
    }
    if histories.is_empty() {
        bail!("No price history for any of {:?}", config.tickers);
    }

    let frame = CombinedFrame::from_histories(&histories, config.windows)?;
    write_snapshot(&frame, &config.snapshot_path)
        .with_context(|| format!("Failed to write snapshot {}", config.snapshot_path.display()))?;
    writeln!(
        out,
        "Saved {} rows for {} tickers to {}",
        frame.len(),
        histories.len(),
        config.snapshot_path.display()
    )?;

    let report = clean(&frame, config.z_threshold)?;
    info!(dropped = report.dropped.len(), "outlier rows removed from analysis set");
    let analysis = analyze(&report.cleaned, config.windows)?;

    presenter::print_summaries(out, &analysis.summaries, config.windows)?;
    presenter::print_monthly_returns(out, &analysis.monthly_returns)?;
    presenter::print_correlation(out, &analysis.correlation)?;

    let fetched: Vec<String> = histories.iter().map(|(ticker, _)| ticker.clone()).collect();
    let valuation =
        ValuationComparison::collect(source, &fetched).context("Failed to fetch valuation ratios")?;
    presenter::print_valuation(out, &valuation)?;

    Ok(CrawlOutcome {
        frame,
        skipped,
        outlier_rows: report.dropped.len(),
        valuation,
    })
}

/// Configured tickers present in the snapshot, in configured order
fn snapshot_tickers(config: &AnalysisConfig, frame: &CombinedFrame) -> Vec<String> {
    let available = frame.tickers();
    config
        .normalized_tickers()
        .into_iter()
        .filter(|t| {
            let present = available.contains(t);
            if !present {
                warn!(ticker = %t, "ticker not in snapshot, skipping");
            }
            present
        })
        .collect()
}

fn load_snapshot(config: &AnalysisConfig) -> Result<CombinedFrame> {
    read_snapshot(&config.snapshot_path).with_context(|| {
        format!(
            "Failed to read snapshot {}; run `crawl` first",
            config.snapshot_path.display()
        )
    })
}

/// One answered scenario prompt
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub ticker: String,
    /// `None` when the answer was not BULL or BEAR
    pub scenario: Option<Scenario>,
}

/// Ask for a scenario per ticker, then fit and forecast the shocked series.
///
/// Answers come from `input`, one line per ticker. An unrecognized answer is
/// reported and the ticker skipped.
pub fn run_scenario<R, W>(config: &AnalysisConfig, input: &mut R, out: &mut W) -> Result<Vec<ScenarioOutcome>>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let frame = load_snapshot(config)?;
    let model = AdditiveDecomposition::new(config.forecast.clone())?;
    let mut outcomes = Vec::new();

    for ticker in snapshot_tickers(config, &frame) {
        write!(out, "Enter market scenario for {} (BULL or BEAR): ", ticker)?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let Some(scenario) = Scenario::from_prompt(&answer) else {
            writeln!(out, "Invalid input {:?}. Please enter BULL or BEAR.", answer.trim())?;
            outcomes.push(ScenarioOutcome { ticker, scenario: None });
            continue;
        };

        let series = frame.close_series(&ticker)?;
        let Some(last) = series.last() else {
            warn!(ticker = %ticker, "no closing prices in snapshot");
            outcomes.push(ScenarioOutcome { ticker, scenario: None });
            continue;
        };
        let last_close = last.close;

        let forecast = model
            .train(&scenario.adjust(&series))
            .and_then(|trained| trained.forecast(config.horizon))
            .with_context(|| format!("Failed to forecast {} under {} scenario", ticker, scenario))?;
        presenter::print_forecast(out, &ticker, scenario, last_close, &forecast, FORECAST_TABLE_ROWS)?;

        outcomes.push(ScenarioOutcome {
            ticker,
            scenario: Some(scenario),
        });
    }

    Ok(outcomes)
}

/// Metrics in a machine-readable shape for `--json`
#[derive(Debug, Serialize)]
struct EvaluationRecord<'a> {
    ticker: &'a str,
    model: &'a str,
    train_len: usize,
    test_len: usize,
    mae: f64,
    rmse: f64,
    r2: Option<f64>,
}

/// Fit on the leading share of each ticker's closes and score on the rest
pub fn run_evaluate<W>(config: &AnalysisConfig, json: bool, out: &mut W) -> Result<Vec<EvaluationReport>>
where
    W: Write + ?Sized,
{
    let frame = load_snapshot(config)?;
    let model = AdditiveDecomposition::new(config.forecast.clone())?;

    let mut reports = Vec::new();
    for ticker in snapshot_tickers(config, &frame) {
        let series = frame.close_series(&ticker)?;
        let report = evaluate_model(&model, &series, config.train_fraction)
            .with_context(|| format!("Failed to evaluate {}", ticker))?;
        reports.push(report);
    }

    if json {
        let records: Vec<EvaluationRecord> = reports
            .iter()
            .map(|r| EvaluationRecord {
                ticker: &r.ticker,
                model: &r.model,
                train_len: r.train_len,
                test_len: r.test_len,
                mae: r.metrics.mae,
                rmse: r.metrics.rmse,
                r2: r.metrics.r2,
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
    } else {
        presenter::print_evaluations(out, &reports)?;
    }

    Ok(reports)
}

/// Moving-average tables and history-based scenario paths per ticker
pub fn run_visualize<W>(config: &AnalysisConfig, out: &mut W) -> Result<()>
where
    W: Write + ?Sized,
{
    let frame = load_snapshot(config)?;
    let filled = forward_fill(&frame);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let tickers = snapshot_tickers(config, &filled);
    for ticker in &tickers {
        presenter::print_moving_averages(out, &filled, ticker, config.windows, MOVING_AVERAGE_TABLE_ROWS)?;
    }

    for ticker in &tickers {
        let series = filled.close_series(ticker)?;
        let Some(last) = series.last() else {
            continue;
        };
        let paths = simulate_scenarios(&series, &Scenario::ALL, &config.simulation, &mut rng)
            .with_context(|| format!("Failed to simulate {}", ticker))?;
        presenter::print_simulation(out, ticker, last.close, &paths)?;
    }

    Ok(())
}
