//! Gap filling and outlier removal for the analysis set
//!
//! Both steps run on a copy of the frame after the snapshot has been written;
//! the persisted file keeps the raw rows.

use crate::error::Result;
use crate::frame::CombinedFrame;
use chrono::NaiveDate;
use trade_math::statistics::z_scores;
use tracing::debug;

/// Default absolute z-score at which a row is considered an outlier
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Propagate the last defined value into later gaps. Leading gaps stay empty.
pub fn forward_fill_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Forward-fill every column of the frame
pub fn forward_fill(frame: &CombinedFrame) -> CombinedFrame {
    frame.map_columns(forward_fill_column)
}

/// Result of the outlier filter
#[derive(Debug, Clone)]
pub struct OutlierReport {
    /// Frame without the outlier rows
    pub cleaned: CombinedFrame,
    /// Dates of the rows that were dropped
    pub dropped: Vec<NaiveDate>,
}

/// Drop every row in which any column's z-score reaches `threshold`.
///
/// Z-scores are computed per column over that column's defined values. Empty
/// cells and constant columns never flag a row.
pub fn remove_outliers(frame: &CombinedFrame, threshold: f64) -> Result<OutlierReport> {
    let mut keep = vec![true; frame.len()];

    for column in frame.columns() {
        for (row, z) in z_scores(&column.values).into_iter().enumerate() {
            if matches!(z, Some(z) if z.abs() >= threshold) {
                keep[row] = false;
            }
        }
    }

    let dropped: Vec<NaiveDate> = frame
        .dates()
        .iter()
        .zip(&keep)
        .filter(|(_, k)| !**k)
        .map(|(d, _)| *d)
        .collect();

    debug!(
        rows = frame.len(),
        dropped = dropped.len(),
        threshold,
        "outlier filter applied"
    );

    Ok(OutlierReport {
        cleaned: frame.select_rows(&keep)?,
        dropped,
    })
}

/// Forward fill, then drop outlier rows
pub fn clean(frame: &CombinedFrame, threshold: f64) -> Result<OutlierReport> {
    remove_outliers(&forward_fill(frame), threshold)
}
