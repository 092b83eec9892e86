use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use stock_scenarios::config::{AnalysisConfig, ProviderKind};
use stock_scenarios::logging::{init_logging, LoggingConfig};
use stock_scenarios::pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "STOCK_SCENARIOS_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for this tool
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch price history, write the snapshot and print descriptive reports
    Crawl,
    /// Pick BULL or BEAR per ticker and forecast the shocked series
    Scenario {
        /// Days to forecast past the last close
        #[arg(long)]
        horizon: Option<usize>,
    },
    /// Score the forecaster on the last part of each ticker's history
    Evaluate {
        /// Print metrics as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Moving averages and history-based scenario simulation
    Visualize {
        /// Days to simulate
        #[arg(long)]
        days: Option<usize>,
        /// Seed for reproducible simulation
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct Overrides {
    /// Comma-separated ticker symbols
    #[arg(long, global = true, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Snapshot CSV path
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// First day of history (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Day after the last day of history (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Market data source
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderKind>,

    /// Directory of <TICKER>.csv files for the csv provider
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut AnalysisConfig) {
        if let Some(tickers) = self.tickers {
            config.tickers = tickers;
        }
        if let Some(snapshot) = self.snapshot {
            config.snapshot_path = snapshot;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        if let Some(provider) = self.provider {
            config.provider.kind = provider;
        }
        if let Some(dir) = self.data_dir {
            config.provider.data_dir = Some(dir);
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.verbose();
    }
    init_logging(logging)?;

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    cli.overrides.apply(&mut config);
    match &cli.command {
        Command::Scenario { horizon: Some(h) } => config.horizon = *h,
        Command::Visualize { days, seed } => {
            if let Some(days) = days {
                config.simulation.days = *days;
            }
            if seed.is_some() {
                config.seed = *seed;
            }
        }
        _ => {}
    }
    config.validate()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Crawl => {
            let source = pipeline::build_source(&config)?;
            let outcome = pipeline::run_crawl(&config, source.as_ref(), &mut out)?;
            if !outcome.skipped.is_empty() {
                tracing::warn!(skipped = ?outcome.skipped, "tickers without data");
            }
        }
        Command::Scenario { .. } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            pipeline::run_scenario(&config, &mut input, &mut out)?;
        }
        Command::Evaluate { json } => {
            pipeline::run_evaluate(&config, json, &mut out)?;
        }
        Command::Visualize { .. } => {
            pipeline::run_visualize(&config, &mut out)?;
        }
    }

    Ok(())
}
