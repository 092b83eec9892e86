//! # Scenario Forecast
//!
//! Price-history analysis and forecasting under hypothetical market conditions.
//!
//! ## Features
//!
//! - Daily price series with validated ordering, loaded from CSV or a market data provider
//! - Moving averages, daily returns, forward filling and z-score outlier removal
//! - Bullish / bearish / neutral scenarios, as a price shock or a resampled future path
//! - An additive trend + seasonality forecaster with uncertainty intervals
//! - Train/test evaluation with MAE, RMSE and R²
//! - A multi-ticker snapshot CSV and descriptive statistics over it
//!
//! ## Quick Start
//!
//! ```no_run
//! use scenario_forecast::data::DataLoader;
//! use scenario_forecast::metrics::evaluate_model;
//! use scenario_forecast::models::{AdditiveDecomposition, TrainedForecastModel, ForecastModel};
//! use scenario_forecast::scenario::Scenario;
//!
//! # fn main() -> scenario_forecast::error::Result<()> {
//! let series = DataLoader::from_csv("AAPL.csv")?;
//!
//! // Forecast a year ahead under a bullish shock
//! let model = AdditiveDecomposition::default();
//! let forecast = model.train(&Scenario::Bullish.adjust(&series))?.forecast(365)?;
//! println!("{} future rows", forecast.horizon());
//!
//! // Score the model on the last 20% of the history
//! let report = evaluate_model(&model, &series, 0.8)?;
//! println!("{}", report.metrics);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cleaning;
pub mod data;
pub mod error;
pub mod features;
pub mod frame;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
pub mod utils;
pub mod valuation;
pub mod volatility;

// Re-export commonly used types
pub use crate::data::{Bar, DataLoader, PricePoint, PriceSeries};
pub use crate::error::ForecastError;
pub use crate::frame::CombinedFrame;
pub use crate::metrics::{EvaluationMetrics, EvaluationReport};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::scenario::Scenario;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
