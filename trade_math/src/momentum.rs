//! Price momentum
//!
//! Momentum over `period` bars is the raw price difference
//! `price[i] - price[i - period]`.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Streaming momentum indicator
#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    prices: VecDeque<f64>,
}

impl Momentum {
    /// Create a new momentum indicator looking back `period` bars
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            prices: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update with the latest price
    pub fn update(&mut self, price: f64) {
        self.prices.push_back(price);
        if self.prices.len() > self.period + 1 {
            self.prices.pop_front();
        }
    }

    /// Current momentum value
    pub fn value(&self) -> Result<f64> {
        match (self.prices.front(), self.prices.back()) {
            (Some(first), Some(last)) if self.prices.len() == self.period + 1 => Ok(last - first),
            _ => Err(MathError::InsufficientData(format!(
                "Momentum needs {} prices, have {}",
                self.period + 1,
                self.prices.len()
            ))),
        }
    }
}

/// Momentum over a full price column, `None` for the first `period` entries.
pub fn momentum_series(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator = Momentum::new(period)?;
    Ok(prices
        .iter()
        .map(|&p| {
            indicator.update(p);
            indicator.value().ok()
        })
        .collect())
}
