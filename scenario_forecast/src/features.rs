//! Moving averages and daily returns derived from a closing-price series

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::volatility::daily_returns;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::rolling_mean;

/// Short and long moving-average windows, in trading days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureWindows {
    pub short: usize,
    pub long: usize,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self { short: 30, long: 90 }
    }
}

impl FeatureWindows {
    /// Reject zero-sized windows
    pub fn validate(&self) -> Result<()> {
        if self.short == 0 || self.long == 0 {
            return Err(ForecastError::InvalidParameter(
                "Moving average windows must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A price point with its derived features
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedPoint {
    pub date: NaiveDate,
    pub close: f64,
    /// Mean of the last `short` closes, undefined for the first `short - 1` points
    pub moving_avg_short: Option<f64>,
    /// Mean of the last `long` closes, undefined for the first `long - 1` points
    pub moving_avg_long: Option<f64>,
    /// Simple return against the previous close, undefined at the first point
    pub daily_return: Option<f64>,
}

/// Price series with aligned moving averages and returns
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    ticker: String,
    windows: FeatureWindows,
    points: Vec<DerivedPoint>,
}

impl DerivedSeries {
    /// Derive features for every point of `series`
    pub fn build(series: &PriceSeries, windows: FeatureWindows) -> Result<Self> {
        windows.validate()?;

        let closes = series.values();
        let short = rolling_mean(&closes, windows.short)?;
        let long = rolling_mean(&closes, windows.long)?;
        let returns = daily_returns(&closes);

        let points = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| DerivedPoint {
                date: p.date,
                close: p.close,
                moving_avg_short: short[i],
                moving_avg_long: long[i],
                daily_return: returns[i],
            })
            .collect();

        Ok(Self {
            ticker: series.ticker().to_string(),
            windows,
            points,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn windows(&self) -> FeatureWindows {
        self.windows
    }

    pub fn points(&self) -> &[DerivedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn moving_avg_short(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.moving_avg_short).collect()
    }

    pub fn moving_avg_long(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.moving_avg_long).collect()
    }

    pub fn daily_returns(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.daily_return).collect()
    }
}
