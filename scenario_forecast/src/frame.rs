//! Multi-ticker frame keyed by trading date
//!
//! This is the in-memory shape of the snapshot file: one row per date in the
//! union of all tickers' trading days, and per-ticker suffixed columns
//! (`AAPL_Close`, `AAPL_30MA`, ...). Cells a ticker has no value for are `None`.

use crate::data::{Bar, PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::features::{DerivedSeries, FeatureWindows};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Per-ticker column kinds, in the order they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    Open,
    High,
    Low,
    Close,
    Volume,
    MovingAverage(usize),
    Returns,
}

impl FrameField {
    /// Column suffix after `{TICKER}_`
    pub fn suffix(&self) -> String {
        match self {
            FrameField::Open => "Open".to_string(),
            FrameField::High => "High".to_string(),
            FrameField::Low => "Low".to_string(),
            FrameField::Close => "Close".to_string(),
            FrameField::Volume => "Volume".to_string(),
            FrameField::MovingAverage(window) => format!("{}MA", window),
            FrameField::Returns => "Returns".to_string(),
        }
    }

    /// All fields of one ticker in schema order
    pub fn schema(windows: FeatureWindows) -> [FrameField; 8] {
        [
            FrameField::Open,
            FrameField::High,
            FrameField::Low,
            FrameField::Close,
            FrameField::Volume,
            FrameField::MovingAverage(windows.short),
            FrameField::MovingAverage(windows.long),
            FrameField::Returns,
        ]
    }
}

/// `{TICKER}_{suffix}`
pub fn column_name(ticker: &str, field: FrameField) -> String {
    format!("{}_{}", ticker, field.suffix())
}

/// A named column of optional values
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table of per-ticker columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombinedFrame {
    dates: Vec<NaiveDate>,
    columns: Vec<FrameColumn>,
}

impl CombinedFrame {
    /// Empty frame over `dates`, which must be strictly increasing
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Frame dates must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            dates,
            columns: Vec::new(),
        })
    }

    /// Outer-join several tickers' bars on date and derive their features.
    ///
    /// Features are computed on each ticker's own trading days before being
    /// placed on the shared index. Tickers keep the order given.
    pub fn from_histories(histories: &[(String, Vec<Bar>)], windows: FeatureWindows) -> Result<Self> {
        let all_dates: BTreeSet<NaiveDate> = histories
            .iter()
            .flat_map(|(_, bars)| bars.iter().map(|b| b.date))
            .collect();
        let mut frame = Self::new(all_dates.into_iter().collect())?;

        for (ticker, bars) in histories {
            let series = PriceSeries::from_bars(ticker.clone(), bars)?;
            let derived = DerivedSeries::build(&series, windows)?;
            let dates = series.dates();

            let pick = |values: Vec<f64>| values.into_iter().map(Some).collect::<Vec<_>>();
            let per_ticker: [(FrameField, Vec<Option<f64>>); 8] = [
                (FrameField::Open, pick(bars.iter().map(|b| b.open).collect())),
                (FrameField::High, pick(bars.iter().map(|b| b.high).collect())),
                (FrameField::Low, pick(bars.iter().map(|b| b.low).collect())),
                (FrameField::Close, pick(series.values())),
                (FrameField::Volume, pick(bars.iter().map(|b| b.volume).collect())),
                (FrameField::MovingAverage(windows.short), derived.moving_avg_short()),
                (FrameField::MovingAverage(windows.long), derived.moving_avg_long()),
                (FrameField::Returns, derived.daily_returns()),
            ];

            for (field, values) in per_ticker {
                let aligned = frame.align(&dates, &values)?;
                frame.push_column(column_name(ticker, field), aligned)?;
            }
        }

        Ok(frame)
    }

    /// Place `values` observed on `dates` onto this frame's index
    fn align(&self, dates: &[NaiveDate], values: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
        let mut aligned = vec![None; self.dates.len()];
        for (date, value) in dates.iter().zip(values) {
            let row = self.dates.binary_search(date).map_err(|_| {
                ForecastError::DataError(format!("Date {} is not in the frame index", date))
            })?;
            aligned[row] = *value;
        }
        Ok(aligned)
    }

    /// Append a column; its length must match the index
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' has {} rows, frame has {}",
                name,
                values.len(),
                self.dates.len()
            )));
        }
        if self.column(&name).is_some() {
            return Err(ForecastError::DataError(format!("Duplicate column '{}'", name)));
        }

        self.columns.push(FrameColumn { name, values });
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[FrameColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of the named column
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of a ticker's field, or a data error naming the missing column
    pub fn field(&self, ticker: &str, field: FrameField) -> Result<&[Option<f64>]> {
        let name = column_name(ticker, field);
        self.column(&name)
            .ok_or_else(|| ForecastError::DataError(format!("Missing column '{}'", name)))
    }

    /// Tickers with a close column, in column order
    pub fn tickers(&self) -> Vec<String> {
        let suffix = format!("_{}", FrameField::Close.suffix());
        self.columns
            .iter()
            .filter_map(|c| c.name.strip_suffix(&suffix).map(str::to_string))
            .collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// A ticker's closing prices on the rows where it has one
    pub fn close_series(&self, ticker: &str) -> Result<PriceSeries> {
        let closes = self.field(ticker, FrameField::Close)?;
        let points = self
            .dates
            .iter()
            .zip(closes)
            .filter_map(|(date, close)| close.map(|close| PricePoint { date: *date, close }))
            .collect();

        PriceSeries::new(ticker, points)
    }

    /// Keep the rows where `keep` is true
    pub fn select_rows(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.dates.len() {
            return Err(ForecastError::DataError(format!(
                "Row mask has {} entries, frame has {} rows",
                keep.len(),
                self.dates.len()
            )));
        }

        let filter = |values: &[Option<f64>]| {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect::<Vec<_>>()
        };

        Ok(Self {
            dates: filter_dates(&self.dates, keep),
            columns: self
                .columns
                .iter()
                .map(|c| FrameColumn {
                    name: c.name.clone(),
                    values: filter(&c.values),
                })
                .collect(),
        })
    }

    /// Same index, every column transformed by `f`
    pub fn map_columns(&self, f: impl Fn(&[Option<f64>]) -> Vec<Option<f64>>) -> Self {
        Self {
            dates: self.dates.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| FrameColumn {
                    name: c.name.clone(),
                    values: f(&c.values),
                })
                .collect(),
        }
    }
}

fn filter_dates(dates: &[NaiveDate], keep: &[bool]) -> Vec<NaiveDate> {
    dates
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(d, _)| *d)
        .collect()
}
