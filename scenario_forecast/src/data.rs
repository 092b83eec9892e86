//! Price series handling for forecasting

use crate::error::{ForecastError, Result};
use crate::utils::parse_date;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One closing price on one trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

/// Daily OHLCV bar as delivered by a market data provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

impl From<&Bar> for PricePoint {
    fn from(bar: &Bar) -> Self {
        PricePoint {
            date: bar.date,
            close: bar.close,
        }
    }
}

/// Ordered closing prices for one ticker.
///
/// Dates are strictly increasing and every value is finite; both are checked
/// on construction, so downstream code can rely on them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, rejecting unordered or duplicate dates
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let ticker = ticker.into();

        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "{}: non-finite value {} on {}",
                ticker, bad.close, bad.date
            )));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataError(format!(
                "{}: dates must be strictly increasing ({} followed by {})",
                ticker, pair[0].date, pair[1].date
            )));
        }

        Ok(Self { ticker, points })
    }

    /// Build a series from OHLCV bars by keeping the closes
    pub fn from_bars(ticker: impl Into<String>, bars: &[Bar]) -> Result<Self> {
        Self::new(ticker, bars.iter().map(PricePoint::from).collect())
    }

    /// Create a series on consecutive calendar days starting at `start`
    pub fn from_values(ticker: impl Into<String>, start: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = start
            .iter_days()
            .zip(values)
            .map(|(date, &close)| PricePoint { date, close })
            .collect();
        Self::new(ticker, points)
    }

    /// Ticker symbol
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// All points in date order
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Closing values in order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Last point, if any
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Split by position into `[0, at)` and `[at, len)`
    pub fn split_at(&self, at: usize) -> Result<(Self, Self)> {
        if at > self.points.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Split position {} beyond series length {}",
                at,
                self.points.len()
            )));
        }

        let (head, tail) = self.points.split_at(at);
        Ok((
            Self {
                ticker: self.ticker.clone(),
                points: head.to_vec(),
            },
            Self {
                ticker: self.ticker.clone(),
                points: tail.to_vec(),
            },
        ))
    }

    /// Apply `f` to every value, keeping dates
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self
                .points
                .iter()
                .map(|p| PricePoint {
                    date: p.date,
                    close: f(p.close),
                })
                .collect(),
        }
    }
}

/// Data loader for single-ticker price files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a (date, close) series from a CSV file.
    ///
    /// The ticker is taken from the file stem.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
        let path = path.as_ref();
        let ticker = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("series")
            .to_uppercase();

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(ticker, &df)
    }

    /// Create a series from an existing DataFrame
    pub fn from_dataframe(ticker: impl Into<String>, df: &DataFrame) -> Result<PriceSeries> {
        let time_column = Self::detect_time_column(df)?;
        let close_column = Self::detect_close_column(df)?;

        let dates = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let closes = df.column(&close_column)?.cast(&DataType::Float64)?;

        let mut points = Vec::with_capacity(df.height());
        for (date, close) in dates.utf8()?.into_iter().zip(closes.f64()?.into_iter()) {
            // Rows without a date or a close carry no observation
            if let (Some(date), Some(close)) = (date, close) {
                points.push(PricePoint {
                    date: parse_date(date)?,
                    close,
                });
            }
        }

        PriceSeries::new(ticker, points)
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time") || lower == "ds"
            })
            .map(str::to_string)
            .ok_or_else(|| ForecastError::DataError("No time column found in data".to_string()))
    }

    /// Detect the closing price column, falling back to a generic price column
    fn detect_close_column(df: &DataFrame) -> Result<String> {
        let names = df.get_column_names();

        names
            .iter()
            .find(|name| name.to_lowercase().contains("close"))
            .or_else(|| names.iter().find(|name| name.to_lowercase().contains("price")))
            .or_else(|| names.iter().find(|name| **name == "y"))
            .map(|name| name.to_string())
            .ok_or_else(|| ForecastError::DataError("No price columns found in data".to_string()))
    }
}
