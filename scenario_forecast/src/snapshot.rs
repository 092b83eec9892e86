//! Snapshot CSV of the combined multi-ticker frame
//!
//! Layout: a `Date` column with ISO dates, then every frame column in order.
//! Undefined cells are written empty. Extra columns in files produced by
//! other tools (a `Dividends` column, say) are read like any other column.

use crate::error::{ForecastError, Result};
use crate::frame::CombinedFrame;
use crate::utils::parse_date;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Name of the index column
pub const DATE_COLUMN: &str = "Date";

/// Convert a frame into a DataFrame with the index as the first column
pub fn to_dataframe(frame: &CombinedFrame) -> Result<DataFrame> {
    let dates: Vec<String> = frame
        .dates()
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let mut series = Vec::with_capacity(frame.columns().len() + 1);
    series.push(Series::new(DATE_COLUMN, dates));
    for column in frame.columns() {
        series.push(Series::new(&column.name, column.values.as_slice()));
    }

    Ok(DataFrame::new(series)?)
}

/// Convert a DataFrame back into a frame. The date column is located by name.
pub fn from_dataframe(df: &DataFrame) -> Result<CombinedFrame> {
    let date_column = df
        .get_column_names()
        .into_iter()
        .find(|name| name.eq_ignore_ascii_case(DATE_COLUMN))
        .map(str::to_string)
        .ok_or_else(|| ForecastError::DataError("Snapshot has no Date column".to_string()))?;

    let raw_dates = df.column(&date_column)?.cast(&DataType::Utf8)?;
    let dates = raw_dates
        .utf8()?
        .into_iter()
        .map(|d| {
            d.ok_or_else(|| ForecastError::DataError("Snapshot row without a date".to_string()))
                .and_then(parse_date)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut frame = CombinedFrame::new(dates)?;
    for column in df.get_columns() {
        if column.name() == date_column {
            continue;
        }
        let values: Vec<Option<f64>> = column.cast(&DataType::Float64)?.f64()?.into_iter().collect();
        frame.push_column(column.name(), values)?;
    }

    Ok(frame)
}

/// Write the frame to `path`, replacing any existing file
pub fn write_snapshot<P: AsRef<Path>>(frame: &CombinedFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut df = to_dataframe(frame)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;

    info!(
        path = %path.display(),
        rows = frame.len(),
        columns = frame.columns().len(),
        "snapshot written"
    );
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`]
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<CombinedFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ForecastError::DataError(format!("Cannot open snapshot {}: {}", path.display(), e))
    })?;
    let df = CsvReader::new(file)
        .infer_schema(None)
        .has_header(true)
        .finish()?;

    let frame = from_dataframe(&df)?;
    info!(path = %path.display(), rows = frame.len(), "snapshot loaded");
    Ok(frame)
}
