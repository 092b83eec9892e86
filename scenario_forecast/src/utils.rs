//! Utility functions for the scenario_forecast crate

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// Split a series by position into a training prefix and a test suffix.
///
/// The prefix holds `floor(len * train_fraction)` points. Order is preserved;
/// nothing is shuffled.
pub fn train_test_split(series: &PriceSeries, train_fraction: f64) -> Result<(PriceSeries, PriceSeries)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Train fraction must be within (0, 1), got {}",
            train_fraction
        )));
    }

    let train_size = (series.len() as f64 * train_fraction).floor() as usize;
    series.split_at(train_size)
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            last.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::DataError(format!("Date overflow {} days after {}", offset, last))
            })
        })
        .collect()
}

/// Parse an ISO date, tolerating a trailing time or offset (`2011-01-03 00:00:00-05:00`)
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{}': {}", raw, e)))
}
