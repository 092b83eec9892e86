//! Metrics for evaluating forecast performance

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::utils::train_test_split;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Accuracy of a forecast against held-out actuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination; `None` when the actuals have no variance
    pub r2: Option<f64>,
}

impl EvaluationMetrics {
    /// Score `predicted` against `actual`, pairing values by position
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        Ok(Self {
            mae: mean_absolute_error(actual, predicted)?,
            rmse: root_mean_squared_error(actual, predicted)?,
            r2: r_squared(actual, predicted)?,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAE: {:.4}, RMSE: {:.4}, R²: ", self.mae, self.rmse)?;
        match self.r2 {
            Some(r2) => write!(f, "{:.4}", r2),
            None => f.write_str("undefined"),
        }
    }
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData(
            "Cannot score an empty test set".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DataError(format!(
            "Actual ({}) and predicted ({}) lengths differ",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean of `|actual - predicted|`
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let total: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(total / actual.len() as f64)
}

/// Square root of the mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let total: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((total / actual.len() as f64).sqrt())
}

/// `1 - SSR / SST`, or `None` when the actuals are constant
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<Option<f64>> {
    check_pair(actual, predicted)?;
    // Zero variance only when every actual is the same value
    if actual.iter().all(|a| *a == actual[0]) {
        return Ok(None);
    }

    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let sst: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ssr: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();

    Ok(Some(1.0 - ssr / sst))
}

/// Outcome of one train/test evaluation
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub ticker: String,
    pub model: String,
    pub train_len: usize,
    pub test_len: usize,
    pub metrics: EvaluationMetrics,
    /// Forecast over the training history and the test horizon
    pub forecast: ForecastResult,
    /// Held-out actuals
    pub test: PriceSeries,
}

/// Fit `model` on the leading share of `series` and score it on the rest.
///
/// The forecast horizon equals the test length and forecast rows are paired
/// with test rows by position, not by date.
pub fn evaluate_model<M: ForecastModel>(
    model: &M,
    series: &PriceSeries,
    train_fraction: f64,
) -> Result<EvaluationReport> {
    if series.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "{}: no observations to evaluate",
            series.ticker()
        )));
    }

    let (train, test) = train_test_split(series, train_fraction)?;
    if test.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "{}: test split is empty ({} observations)",
            series.ticker(),
            series.len()
        )));
    }

    let trained = model.train(&train)?;
    let forecast = trained.forecast(test.len())?;
    let predicted: Vec<f64> = forecast.tail(test.len()).iter().map(|r| r.predicted).collect();
    let metrics = EvaluationMetrics::compute(&test.values(), &predicted)?;

    info!(
        ticker = series.ticker(),
        train = train.len(),
        test = test.len(),
        mae = metrics.mae,
        rmse = metrics.rmse,
        "model evaluated"
    );

    Ok(EvaluationReport {
        ticker: series.ticker().to_string(),
        model: trained.name().to_string(),
        train_len: train.len(),
        test_len: test.len(),
        metrics,
        forecast,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let metrics = EvaluationMetrics::compute(&actual, &actual).unwrap();

        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.r2, Some(1.0));
    }

    #[test]
    fn test_known_errors() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 5.0];

        assert!((mean_absolute_error(&actual, &predicted).unwrap() - 1.0).abs() < 1e-12);
        assert!((root_mean_squared_error(&actual, &predicted).unwrap() - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        // SST = 2, SSR = 5
        assert!((r_squared(&actual, &predicted).unwrap().unwrap() + 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_actuals_undefined_r2() {
        let actual = [7.0; 5];
        let predicted = [6.0, 7.0, 8.0, 7.0, 7.0];

        assert_eq!(r_squared(&actual, &predicted).unwrap(), None);
        let metrics = EvaluationMetrics::compute(&actual, &predicted).unwrap();
        assert!(metrics.to_string().ends_with("undefined"));
    }

    #[test]
    fn test_r2_defined_for_small_spread_at_large_scale() {
        let actual = [1e8, 1e8 + 1.0, 1e8, 1e8 + 1.0];
        let predicted = [1e8 + 0.5; 4];

        // SST = SSR = 1
        assert_eq!(r_squared(&actual, &predicted).unwrap(), Some(0.0));
        assert_eq!(r_squared(&[1e8 + 0.25; 4], &predicted).unwrap(), None);
    }

    #[test]
    fn test_empty_and_mismatched() {
        assert!(matches!(
            mean_absolute_error(&[], &[]),
            Err(ForecastError::InsufficientData(_))
        ));
        assert!(matches!(
            r_squared(&[1.0, 2.0], &[1.0]),
            Err(ForecastError::DataError(_))
        ));
    }
}
