//! History-based scenario simulation
//!
//! Future paths are built by resampling the series' own daily returns, damped
//! by a scale factor and shifted up (Bullish) or down (Bearish) by one
//! standard deviation of the damped returns, then compounded from the last
//! close. The caller supplies the random source.

use crate::data::{PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::scenario::Scenario;
use crate::utils::future_dates;
use crate::volatility::daily_returns;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use trade_math::statistics::sample_std;

/// Simulation length and return damping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of future calendar days to simulate
    pub days: usize,
    /// Factor applied to historical returns before resampling
    pub return_scale: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 100,
            return_scale: 0.5,
        }
    }
}

/// One simulated future path
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    pub scenario: Scenario,
    pub points: Vec<PricePoint>,
}

impl SimulatedPath {
    /// Price on the last simulated day
    pub fn terminal_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}

/// The return distribution a scenario samples from
pub fn scenario_returns(series: &PriceSeries, scenario: Scenario, return_scale: f64) -> Result<Vec<f64>> {
    let scaled: Vec<f64> = daily_returns(&series.values())
        .into_iter()
        .flatten()
        .map(|r| r * return_scale)
        .collect();

    if scaled.len() < 2 {
        return Err(ForecastError::InsufficientData(format!(
            "{}: need at least 3 prices to resample returns",
            series.ticker()
        )));
    }

    let shift = match scenario {
        Scenario::Bullish => sample_std(&scaled)?,
        Scenario::Bearish => -sample_std(&scaled)?,
        Scenario::Neutral => 0.0,
    };

    Ok(scaled.into_iter().map(|r| r + shift).collect())
}

/// Simulate one future path for `scenario`
pub fn simulate_path<R: Rng + ?Sized>(
    series: &PriceSeries,
    scenario: Scenario,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulatedPath> {
    let last = series.last().ok_or_else(|| {
        ForecastError::InsufficientData(format!("{}: empty series", series.ticker()))
    })?;
    let returns = scenario_returns(series, scenario, config.return_scale)?;

    let mut price = last.close;
    let mut points = Vec::with_capacity(config.days);
    for date in future_dates(last.date, config.days)? {
        // scenario_returns guarantees a non-empty pool
        let daily_return = returns.choose(rng).copied().unwrap_or(0.0);
        price *= 1.0 + daily_return;
        points.push(PricePoint { date, close: price });
    }

    Ok(SimulatedPath { scenario, points })
}

/// Simulate each scenario in turn from the same random source
pub fn simulate_scenarios<R: Rng + ?Sized>(
    series: &PriceSeries,
    scenarios: &[Scenario],
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<SimulatedPath>> {
    scenarios
        .iter()
        .map(|&scenario| simulate_path(series, scenario, config, rng))
        .collect()
}
