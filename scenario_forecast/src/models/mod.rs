//! Forecasting models for price series

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;

/// One row of a forecast: point estimate and uncertainty interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forecast over the fitted history followed by the future horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    rows: Vec<ForecastRow>,
    /// Number of leading rows that cover the fitted history
    history_len: usize,
}

impl ForecastResult {
    /// Create a forecast result; `history_len` rows must exist
    pub fn new(rows: Vec<ForecastRow>, history_len: usize) -> Result<Self> {
        if history_len > rows.len() {
            return Err(ForecastError::DataError(format!(
                "History length ({}) exceeds row count ({})",
                history_len,
                rows.len()
            )));
        }

        Ok(Self { rows, history_len })
    }

    /// All rows in date order
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Rows covering the fitted history
    pub fn history(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len]
    }

    /// Rows after the last observed date
    pub fn future(&self) -> &[ForecastRow] {
        &self.rows[self.history_len..]
    }

    /// Number of future rows
    pub fn horizon(&self) -> usize {
        self.rows.len() - self.history_len
    }

    /// Last `n` rows, or all of them when fewer exist
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Point estimates in order
    pub fn predicted_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Fitted history plus `horizon` future days
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Point estimates for arbitrary dates
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a price series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a price series
    fn train(&self, series: &PriceSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod decomposition;
mod least_squares;

pub use decomposition::{AdditiveDecomposition, DecompositionConfig, SeasonalityToggle};
