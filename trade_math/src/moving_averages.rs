//! Moving average calculation implementations
//!
//! Contains the streaming Simple Moving Average (SMA) and a helper that lays a
//! rolling mean over a whole price column.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        Ok(())
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Whether the window is full
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }
}

/// Rolling mean over a full column.
///
/// Position `i` holds the mean of `values[i + 1 - period..=i]`, and `None`
/// while fewer than `period` values have been seen.
pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    let mut out = Vec::with_capacity(values.len());

    for &value in values {
        sma.update(value)?;
        out.push(if sma.is_ready() { Some(sma.value()?) } else { None });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0).unwrap();
        sma.update(4.0).unwrap();
        assert!(sma.value().is_err());

        sma.update(6.0).unwrap();
        assert_eq!(sma.value().unwrap(), 4.0);

        // The window slides, dropping the oldest value
        sma.update(8.0).unwrap();
        assert_eq!(sma.value().unwrap(), 6.0);
    }

    #[test]
    fn test_sma_rejects_zero_period_and_nan() {
        assert!(SimpleMovingAverage::new(0).is_err());

        let mut sma = SimpleMovingAverage::new(2).unwrap();
        assert!(sma.update(f64::NAN).is_err());
    }

    #[test]
    fn test_rolling_mean_leading_gaps() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let rolled = rolling_mean(&values, 3).unwrap();

        assert_eq!(rolled, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_shorter_than_window() {
        let rolled = rolling_mean(&[1.0, 2.0], 5).unwrap();
        assert!(rolled.iter().all(Option::is_none));
    }
}
