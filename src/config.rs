//! Run configuration: defaults, optional YAML file, then command-line overrides

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use scenario_forecast::cleaning::DEFAULT_Z_THRESHOLD;
use scenario_forecast::features::FeatureWindows;
use scenario_forecast::models::DecompositionConfig;
use scenario_forecast::simulation::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where price history and valuation ratios come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Directory for the `csv` provider
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            data_dir: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    /// Exclusive
    pub end: NaiveDate,
    pub snapshot_path: PathBuf,
    pub windows: FeatureWindows,
    /// Days forecast past the last observation in the scenario pipeline
    pub horizon: usize,
    pub train_fraction: f64,
    pub z_threshold: f64,
    pub simulation: SimulationConfig,
    pub forecast: DecompositionConfig,
    pub provider: ProviderConfig,
    /// Seed for scenario simulation; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: ["TSLA", "AAPL", "GOOGL", "MSFT"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            snapshot_path: PathBuf::from("stock_data.csv"),
            windows: FeatureWindows::default(),
            horizon: 365,
            train_fraction: 0.8,
            z_threshold: DEFAULT_Z_THRESHOLD,
            simulation: SimulationConfig::default(),
            forecast: DecompositionConfig::default(),
            provider: ProviderConfig::default(),
            seed: None,
        }
    }
}

impl AnalysisConfig {
    /// Read a YAML file; keys it leaves out keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AnalysisConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject settings no pipeline can run with
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            bail!("At least one ticker is required");
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            bail!("Ticker symbols must not be blank");
        }
        if self.start >= self.end {
            bail!("Start date {} must be before end date {}", self.start, self.end);
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            bail!("Train fraction must be within (0, 1), got {}", self.train_fraction);
        }
        if !(self.z_threshold > 0.0) {
            bail!("Outlier threshold must be positive, got {}", self.z_threshold);
        }
        if self.simulation.days == 0 {
            bail!("Simulation needs at least one day");
        }
        if !(self.simulation.return_scale.is_finite() && self.simulation.return_scale > 0.0) {
            bail!("Return scale must be positive, got {}", self.simulation.return_scale);
        }
        if self.provider.kind == ProviderKind::Csv && self.provider.data_dir.is_none() {
            bail!("The csv provider needs a data directory");
        }
        self.windows.validate()?;
        self.forecast.validate()?;
        Ok(())
    }

    /// Upper-cased ticker symbols in configured order
    pub fn normalized_tickers(&self) -> Vec<String> {
        self.tickers.iter().map(|t| t.trim().to_uppercase()).collect()
    }
}
