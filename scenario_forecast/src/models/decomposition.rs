//! Additive trend and seasonality decomposition
//!
//! The model is `y(t) = trend(t) + yearly(t) + weekly(t) + noise`, where the
//! trend is piecewise linear with changepoints spread over the early part of
//! the history and each seasonality is a truncated Fourier series. All
//! coefficients are fitted jointly by penalized least squares on scaled data:
//! time runs from 0 to 1 over the history and values are divided by their
//! largest magnitude.
//!
//! Uncertainty for fitted dates comes from the residual spread. For future
//! dates the trend itself is uncertain too, so new changepoints are simulated
//! with the same rate and average magnitude as the fitted ones.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::least_squares::solve_ridge;
use crate::models::{ForecastModel, ForecastResult, ForecastRow, TrainedForecastModel};
use crate::utils::future_dates;
use chrono::{Datelike, NaiveDate};
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal as StandardNormal};
use std::f64::consts::PI;
use tracing::debug;
use trade_math::statistics::quantile_sorted;

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const YEAR_DAYS: f64 = 365.25;
const WEEK_DAYS: f64 = 7.0;
/// Two years of history before yearly terms are fitted automatically
const YEARLY_MIN_SPAN_DAYS: f64 = 730.0;

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityToggle {
    /// Decide from the span and spacing of the history
    Auto,
    Enabled,
    Disabled,
}

/// Tuning of the decomposition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Maximum number of trend changepoints
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may fall
    pub changepoint_range: f64,
    /// Prior scale of changepoint rate adjustments; smaller means a stiffer trend
    pub changepoint_prior_scale: f64,
    /// Prior scale of Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Scale of observation noise the priors are measured against
    pub noise_scale: f64,
    pub yearly_order: usize,
    pub weekly_order: usize,
    pub yearly: SeasonalityToggle,
    pub weekly: SeasonalityToggle,
    /// Probability mass inside the reported interval
    pub interval_width: f64,
    /// Monte-Carlo draws for future intervals
    pub uncertainty_samples: usize,
    pub seed: u64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            noise_scale: 0.1,
            yearly_order: 10,
            weekly_order: 3,
            yearly: SeasonalityToggle::Auto,
            weekly: SeasonalityToggle::Auto,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 0,
        }
    }
}

impl DecompositionConfig {
    /// Check that every parameter is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Changepoint range must be within (0, 1], got {}",
                self.changepoint_range
            )));
        }
        for (name, value) in [
            ("Changepoint prior scale", self.changepoint_prior_scale),
            ("Seasonality prior scale", self.seasonality_prior_scale),
            ("Noise scale", self.noise_scale),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval width must be within (0, 1), got {}",
                self.interval_width
            )));
        }
        if self.uncertainty_samples == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one uncertainty sample is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Additive decomposition forecaster
#[derive(Debug, Clone)]
pub struct AdditiveDecomposition {
    name: String,
    config: DecompositionConfig,
}

impl AdditiveDecomposition {
    /// Create a model with the given configuration
    pub fn new(config: DecompositionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: "Additive Decomposition".to_string(),
            config,
        })
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }
}

impl Default for AdditiveDecomposition {
    fn default() -> Self {
        Self {
            name: "Additive Decomposition".to_string(),
            config: DecompositionConfig::default(),
        }
    }
}

/// Fourier series of one seasonal period
#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period: f64,
    order: usize,
}

impl Seasonality {
    fn width(&self) -> usize {
        2 * self.order
    }

    fn push_features(&self, date: NaiveDate, row: &mut Vec<f64>) {
        let x = epoch_days(date);
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * x / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
}

fn epoch_days(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() as i64 - UNIX_EPOCH_DAYS_FROM_CE) as f64
}

fn resolve_toggle(toggle: SeasonalityToggle, order: usize, auto: bool) -> bool {
    order > 0
        && match toggle {
            SeasonalityToggle::Auto => auto,
            SeasonalityToggle::Enabled => true,
            SeasonalityToggle::Disabled => false,
        }
}

/// Changepoint positions in scaled time, evenly spaced over the leading
/// `changepoint_range` share of the observations
fn changepoint_positions(scaled_t: &[f64], config: &DecompositionConfig) -> Vec<f64> {
    let hist_size = (scaled_t.len() as f64 * config.changepoint_range).floor() as usize;
    let count = config.n_changepoints.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut positions: Vec<f64> = (1..=count)
        .map(|j| {
            let index = (last * j as f64 / count as f64).round() as usize;
            scaled_t[index]
        })
        .collect();
    positions.dedup();
    positions
}

/// Fitted additive decomposition
#[derive(Debug, Clone)]
pub struct TrainedAdditiveDecomposition {
    name: String,
    config: DecompositionConfig,
    history_dates: Vec<NaiveDate>,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    offset: f64,
    slope: f64,
    deltas: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    seasonal_coefficients: Vec<f64>,
    /// Residual standard deviation on the scaled values
    sigma: f64,
}

impl ForecastModel for AdditiveDecomposition {
    type Trained = TrainedAdditiveDecomposition;

    fn train(&self, series: &PriceSeries) -> Result<Self::Trained> {
        let n = series.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "{}: need at least 2 observations to fit a trend, got {}",
                series.ticker(),
                n
            )));
        }

        let dates = series.dates();
        let values = series.values();
        let start = dates[0];
        let span_days = (dates[n - 1] - start).num_days() as f64;

        let min_spacing = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .min()
            .unwrap_or(i64::MAX);

        let mut seasonalities = Vec::new();
        if resolve_toggle(self.config.yearly, self.config.yearly_order, span_days >= YEARLY_MIN_SPAN_DAYS) {
            seasonalities.push(Seasonality {
                period: YEAR_DAYS,
                order: self.config.yearly_order,
            });
        }
        if resolve_toggle(
            self.config.weekly,
            self.config.weekly_order,
            span_days >= 2.0 * WEEK_DAYS && (min_spacing as f64) < WEEK_DAYS,
        ) {
            seasonalities.push(Seasonality {
                period: WEEK_DAYS,
                order: self.config.weekly_order,
            });
        }

        let y_scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let target: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let scaled_t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();
        let changepoints = changepoint_positions(&scaled_t, &self.config);
        let seasonal_width: usize = seasonalities.iter().map(Seasonality::width).sum();

        // Columns: offset, slope, changepoint hinges, Fourier terms
        let width = 2 + changepoints.len() + seasonal_width;
        let mut cells = Vec::with_capacity(n * width);
        for (date, &t) in dates.iter().zip(&scaled_t) {
            cells.push(1.0);
            cells.push(t);
            cells.extend(changepoints.iter().map(|&s| (t - s).max(0.0)));
            for seasonality in &seasonalities {
                seasonality.push_features(*date, &mut cells);
            }
        }
        let design = Array2::from_shape_vec((n, width), cells)
            .map_err(|e| ForecastError::ForecastingError(format!("Design matrix shape: {}", e)))?;
        let target = Array1::from(target);

        let delta_penalty = (self.config.noise_scale / self.config.changepoint_prior_scale).powi(2);
        let seasonal_penalty = (self.config.noise_scale / self.config.seasonality_prior_scale).powi(2);
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(delta_penalty).take(changepoints.len()));
        penalties.extend(std::iter::repeat(seasonal_penalty).take(seasonal_width));

        let beta = solve_ridge(&design, &target, &penalties)?;

        let residuals = &target - &design.dot(&beta);
        let ssr = residuals.dot(&residuals);
        let sigma = (ssr / n as f64).sqrt();

        let split = 2 + changepoints.len();
        debug!(
            ticker = series.ticker(),
            observations = n,
            changepoints = changepoints.len(),
            seasonal_terms = seasonal_width,
            sigma,
            "decomposition fitted"
        );

        Ok(TrainedAdditiveDecomposition {
            name: self.name.clone(),
            config: self.config.clone(),
            history_dates: dates,
            start,
            span_days,
            y_scale,
            offset: beta[0],
            slope: beta[1],
            deltas: beta.slice(s![2..split]).to_vec(),
            changepoints,
            seasonalities,
            seasonal_coefficients: beta.slice(s![split..]).to_vec(),
            sigma,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedAdditiveDecomposition {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn trend(&self, t: f64) -> f64 {
        let hinges: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(&s, &delta)| delta * (t - s).max(0.0))
            .sum();
        self.offset + self.slope * t + hinges
    }

    fn seasonal(&self, date: NaiveDate) -> f64 {
        let mut features = Vec::with_capacity(self.seasonal_coefficients.len());
        for seasonality in &self.seasonalities {
            seasonality.push_features(date, &mut features);
        }
        features
            .iter()
            .zip(&self.seasonal_coefficients)
            .map(|(x, b)| x * b)
            .sum()
    }

    /// Point estimate on the scaled axis
    fn scaled_estimate(&self, date: NaiveDate) -> f64 {
        self.trend(self.scaled_time(date)) + self.seasonal(date)
    }

    /// Residual standard deviation in price units
    pub fn residual_std(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Number of trend changepoints actually placed
    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Number of Fourier coefficients in the model
    pub fn seasonal_terms(&self) -> usize {
        self.seasonal_coefficients.len()
    }

    /// Quantile bounds of simulated future outcomes, in scaled units and
    /// relative to the point estimate, one pair per future time
    fn future_deviation_bounds(&self, future_t: &[f64]) -> Result<Vec<(f64, f64)>> {
        let samples = self.config.uncertainty_samples;
        let mut draws = vec![Vec::with_capacity(samples); future_t.len()];
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let horizon_end = future_t.iter().copied().fold(1.0_f64, f64::max);
        let change_rate = self.changepoints.len() as f64 * (horizon_end - 1.0);
        let mean_delta = self.deltas.iter().map(|d| d.abs()).sum::<f64>()
            / self.deltas.len().max(1) as f64
            + 1e-8;

        let poisson = if change_rate > 0.0 {
            Some(Poisson::new(change_rate).map_err(|e| ForecastError::ForecastingError(e.to_string()))?)
        } else {
            None
        };
        let magnitude =
            Exp::new(1.0 / mean_delta).map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
        let noise =
            Normal::new(0.0, self.sigma).map_err(|e| ForecastError::ForecastingError(e.to_string()))?;

        let mut new_changes: Vec<(f64, f64)> = Vec::new();
        for _ in 0..samples {
            new_changes.clear();
            let count = poisson.as_ref().map(|p| p.sample(&mut rng) as usize).unwrap_or(0);
            for _ in 0..count {
                let location = rng.gen_range(1.0..horizon_end);
                // Laplace: exponential magnitude with a random sign
                let size: f64 = magnitude.sample(&mut rng);
                let delta = if rng.gen_bool(0.5) { size } else { -size };
                new_changes.push((location, delta));
            }

            for (column, &t) in draws.iter_mut().zip(future_t) {
                let trend_shift: f64 = new_changes
                    .iter()
                    .map(|&(s, delta)| delta * (t - s).max(0.0))
                    .sum();
                column.push(trend_shift + noise.sample(&mut rng));
            }
        }

        let lower_q = (1.0 - self.config.interval_width) / 2.0;
        let upper_q = 1.0 - lower_q;
        draws
            .into_iter()
            .map(|mut column| {
                column.sort_by(f64::total_cmp);
                Ok((
                    quantile_sorted(&column, lower_q)?,
                    quantile_sorted(&column, upper_q)?,
                ))
            })
            .collect()
    }
}

impl TrainedForecastModel for TrainedAdditiveDecomposition {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let last = *self.history_dates.last().ok_or_else(|| {
            ForecastError::ForecastingError("Model has no fitted history".to_string())
        })?;
        let future = future_dates(last, horizon)?;

        let standard_normal =
            StandardNormal::new(0.0, 1.0).map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
        let z = standard_normal.inverse_cdf((1.0 + self.config.interval_width) / 2.0);
        let half_width = z * self.sigma * self.y_scale;

        let mut rows = Vec::with_capacity(self.history_dates.len() + horizon);
        for &date in &self.history_dates {
            let predicted = self.scaled_estimate(date) * self.y_scale;
            rows.push(ForecastRow {
                date,
                predicted,
                lower: predicted - half_width,
                upper: predicted + half_width,
            });
        }

        let future_t: Vec<f64> = future.iter().map(|d| self.scaled_time(*d)).collect();
        let bounds = self.future_deviation_bounds(&future_t)?;
        for (&date, (low, high)) in future.iter().zip(bounds) {
            let predicted = self.scaled_estimate(date) * self.y_scale;
            // Sampled quantiles may both fall on one side of the estimate
            rows.push(ForecastRow {
                date,
                predicted,
                lower: predicted + low.min(0.0) * self.y_scale,
                upper: predicted + high.max(0.0) * self.y_scale,
            });
        }

        ForecastResult::new(rows, self.history_dates.len())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<f64>> {
        Ok(dates
            .iter()
            .map(|d| self.scaled_estimate(*d) * self.y_scale)
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(offset)
    }

    #[test]
    fn test_changepoints_cover_leading_share() {
        let t: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let positions = changepoint_positions(&t, &DecompositionConfig::default());

        assert_eq!(positions.len(), 25);
        assert!(positions.iter().all(|&s| s > 0.0 && s <= t[79]));
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_no_changepoints_for_tiny_history() {
        let t = vec![0.0, 1.0];
        assert!(changepoint_positions(&t, &DecompositionConfig::default()).is_empty());
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 8).unwrap()), 7.0);
    }

    #[test]
    fn test_seasonality_selection() {
        let short = PriceSeries::from_values("T", day(0), &[1.0, 2.0, 3.0]).unwrap();
        let trained = AdditiveDecomposition::default().train(&short).unwrap();
        assert_eq!(trained.seasonal_terms(), 0);

        let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let month = PriceSeries::from_values("T", day(0), &values).unwrap();
        let trained = AdditiveDecomposition::default().train(&month).unwrap();
        assert_eq!(trained.seasonal_terms(), 6);
    }

    #[test]
    fn test_invalid_config() {
        let config = DecompositionConfig {
            interval_width: 1.5,
            ..DecompositionConfig::default()
        };
        assert!(AdditiveDecomposition::new(config).is_err());
    }

    #[test]
    fn test_future_intervals_reproducible() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0 + i as f64).collect();
        let series = PriceSeries::from_values("T", day(0), &values).unwrap();
        let model = AdditiveDecomposition::default();

        let first = model.train(&series).unwrap().forecast(10).unwrap();
        let second = model.train(&series).unwrap().forecast(10).unwrap();
        assert_eq!(first, second);
    }
}
