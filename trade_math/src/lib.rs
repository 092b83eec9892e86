//! # Trade Math
//!
//! Numeric building blocks for price analysis: rolling means, rolling
//! volatility, momentum and column statistics. Every rolling helper reports
//! undefined positions as `None` rather than a numeric placeholder.

use thiserror::Error;

pub mod momentum;
pub mod moving_averages;
pub mod statistics;
pub mod volatility;

pub use momentum::{momentum_series, Momentum};
pub use moving_averages::{rolling_mean, SimpleMovingAverage};
pub use volatility::{rolling_std, RollingStandardDeviation};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
