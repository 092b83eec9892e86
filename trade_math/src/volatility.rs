//! Volatility indicator implementations
//!
//! Contains the rolling standard deviation used for return volatility.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Rolling sample standard deviation (n - 1 denominator)
#[derive(Debug, Clone)]
pub struct RollingStandardDeviation {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingStandardDeviation {
    /// Create a new rolling standard deviation over `period` values
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(MathError::InvalidInput(
                "Period must be at least 2 for a sample standard deviation".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new observation into the window
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Standard deviation input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Current standard deviation of the window
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data to calculate standard deviation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|&v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (n - 1.0);

        Ok(variance.sqrt())
    }

    /// Whether the window is full
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }

    /// Reset the window
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Rolling sample standard deviation over a column with gaps.
///
/// `None` inputs reset the window, so a value is only produced once `period`
/// consecutive defined observations are available.
pub fn rolling_std(values: &[Option<f64>], period: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingStandardDeviation::new(period)?;
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        match value {
            Some(v) => {
                rolling.update(*v)?;
                out.push(if rolling.is_ready() {
                    Some(rolling.value()?)
                } else {
                    None
                });
            }
            None => {
                rolling.reset();
                out.push(None);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_std_calculation() {
        let mut std = RollingStandardDeviation::new(3).unwrap();
        std.update(2.0).unwrap();
        std.update(4.0).unwrap();
        assert!(std.value().is_err());

        std.update(6.0).unwrap();
        // sample variance of 2,4,6 is 4
        assert!((std.value().unwrap() - 2.0).abs() < 1e-12);

        std.update(6.0).unwrap();
        // window is 4,6,6
        let expected = (4.0f64 / 3.0).sqrt();
        assert!((std.value().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_resets_on_gap() {
        let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(5.0)];
        let out = rolling_std(&values, 2).unwrap();

        assert_eq!(out[0], None);
        assert!(out[1].is_some());
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert!((out[4].unwrap() - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_invalid_period() {
        assert!(RollingStandardDeviation::new(1).is_err());
    }
}
