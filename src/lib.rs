//! # Stock Scenarios
//!
//! Command-line pipelines over daily stock prices, built on `scenario_forecast`:
//!
//! - `crawl` fetches history, writes the snapshot CSV and prints descriptive reports
//! - `scenario` asks for a bullish or bearish view per ticker and forecasts a year ahead
//! - `evaluate` scores the forecaster on a held-out tail of each ticker
//! - `visualize` prints moving averages and history-based scenario paths
//!
//! Only `crawl` talks to a market data provider; the other pipelines read the
//! snapshot it leaves behind.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod presenter;

pub use crate::config::AnalysisConfig;
