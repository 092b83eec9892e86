//! Descriptive statistics over the cleaned multi-ticker frame

use crate::error::Result;
use crate::features::FeatureWindows;
use crate::frame::{CombinedFrame, FrameField};
use crate::volatility::{annualize_daily_volatility, return_volatility};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use trade_math::momentum_series;
use trade_math::statistics::pearson_correlation;

/// Rolling window for return volatility, in trading days
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;
/// Lookback for price momentum, in trading days
pub const DEFAULT_MOMENTUM_PERIOD: usize = 10;

/// Latest state of one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub latest_date: Option<NaiveDate>,
    pub latest_close: Option<f64>,
    pub moving_avg_short: Option<f64>,
    pub moving_avg_long: Option<f64>,
    /// Latest rolling volatility of daily returns, annualized
    pub annualized_volatility: Option<f64>,
    pub momentum: Option<f64>,
}

/// Mean daily return for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyReturn {
    /// 1 = January
    pub month: u32,
    pub mean_return: Option<f64>,
    pub observations: usize,
}

/// Pairwise Pearson correlation of closing prices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    /// `values[i][j]`, undefined when the pair has too few shared rows or no variance
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

/// Everything the visualize pipeline reports
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub summaries: Vec<TickerSummary>,
    pub monthly_returns: Vec<(String, Vec<MonthlyReturn>)>,
    pub correlation: CorrelationMatrix,
}

fn last_defined(values: &[Option<f64>]) -> Option<f64> {
    values.iter().rev().find_map(|v| *v)
}

/// Mean daily return grouped by calendar month, January first
pub fn monthly_mean_returns(frame: &CombinedFrame, ticker: &str) -> Result<Vec<MonthlyReturn>> {
    let returns = frame.field(ticker, FrameField::Returns)?;
    let mut sums = [0.0_f64; 12];
    let mut counts = [0_usize; 12];

    for (date, value) in frame.dates().iter().zip(returns) {
        if let Some(r) = value {
            let slot = date.month0() as usize;
            sums[slot] += r;
            counts[slot] += 1;
        }
    }

    Ok((0..12)
        .map(|slot| MonthlyReturn {
            month: slot as u32 + 1,
            mean_return: (counts[slot] > 0).then(|| sums[slot] / counts[slot] as f64),
            observations: counts[slot],
        })
        .collect())
}

/// Correlation matrix of every ticker's close column
pub fn close_correlation(frame: &CombinedFrame) -> Result<CorrelationMatrix> {
    let tickers = frame.tickers();
    let closes = tickers
        .iter()
        .map(|t| frame.field(t, FrameField::Close))
        .collect::<Result<Vec<_>>>()?;

    let values = closes
        .iter()
        .map(|x| {
            closes
                .iter()
                .map(|y| pearson_correlation(x, y).ok())
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix { tickers, values })
}

/// Rolling sample standard deviation of a ticker's daily returns
pub fn rolling_volatility(frame: &CombinedFrame, ticker: &str, window: usize) -> Result<Vec<Option<f64>>> {
    return_volatility(frame.field(ticker, FrameField::Returns)?, window)
}

/// `close[i] - close[i - period]` within each run of defined closes
pub fn price_momentum(frame: &CombinedFrame, ticker: &str, period: usize) -> Result<Vec<Option<f64>>> {
    let closes = frame.field(ticker, FrameField::Close)?;
    let mut out = vec![None; closes.len()];

    let mut row = 0;
    while row < closes.len() {
        if closes[row].is_none() {
            row += 1;
            continue;
        }
        let run_start = row;
        let mut run = Vec::new();
        while let Some(Some(close)) = closes.get(row) {
            run.push(*close);
            row += 1;
        }
        for (offset, value) in momentum_series(&run, period)?.into_iter().enumerate() {
            out[run_start + offset] = value;
        }
    }

    Ok(out)
}

/// Latest figures for one ticker
pub fn summarize(frame: &CombinedFrame, ticker: &str, windows: FeatureWindows) -> Result<TickerSummary> {
    let closes = frame.field(ticker, FrameField::Close)?;
    let latest_row = closes.iter().rposition(Option::is_some);

    Ok(TickerSummary {
        ticker: ticker.to_string(),
        latest_date: latest_row.map(|row| frame.dates()[row]),
        latest_close: latest_row.and_then(|row| closes[row]),
        moving_avg_short: last_defined(frame.field(ticker, FrameField::MovingAverage(windows.short))?),
        moving_avg_long: last_defined(frame.field(ticker, FrameField::MovingAverage(windows.long))?),
        annualized_volatility: last_defined(&rolling_volatility(frame, ticker, DEFAULT_VOLATILITY_WINDOW)?)
            .map(annualize_daily_volatility),
        momentum: last_defined(&price_momentum(frame, ticker, DEFAULT_MOMENTUM_PERIOD)?),
    })
}

/// Summaries, monthly seasonality and correlation for every ticker in the frame
pub fn analyze(frame: &CombinedFrame, windows: FeatureWindows) -> Result<MarketAnalysis> {
    let tickers = frame.tickers();

    let summaries = tickers
        .iter()
        .map(|t| summarize(frame, t, windows))
        .collect::<Result<Vec<_>>>()?;
    let monthly_returns = tickers
        .iter()
        .map(|t| Ok((t.clone(), monthly_mean_returns(frame, t)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(MarketAnalysis {
        summaries,
        monthly_returns,
        correlation: close_correlation(frame)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn frame_with(columns: &[(&str, Vec<Option<f64>>)]) -> CombinedFrame {
        let start = NaiveDate::from_ymd_opt(2023, 1, 30).unwrap();
        let len = columns[0].1.len();
        let dates = (0..len as u64).map(|i| start + Days::new(i)).collect();
        let mut frame = CombinedFrame::new(dates).unwrap();
        for (name, values) in columns {
            frame.push_column(*name, values.clone()).unwrap();
        }
        frame
    }

    #[test]
    fn test_monthly_grouping() {
        // Jan 30, Jan 31, Feb 1, Feb 2
        let frame = frame_with(&[("A_Returns", vec![None, Some(0.02), Some(0.01), Some(0.03)])]);
        let months = monthly_mean_returns(&frame, "A").unwrap();

        assert_eq!(months.len(), 12);
        assert_eq!(months[0].observations, 1);
        assert!((months[0].mean_return.unwrap() - 0.02).abs() < 1e-12);
        assert!((months[1].mean_return.unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(months[2].mean_return, None);
    }

    #[test]
    fn test_momentum_restarts_after_gap() {
        let closes = vec![Some(1.0), Some(2.0), Some(4.0), None, Some(10.0), Some(13.0)];
        let frame = frame_with(&[("A_Close", closes)]);
        let momentum = price_momentum(&frame, "A", 1).unwrap();

        assert_eq!(momentum, vec![None, Some(1.0), Some(2.0), None, None, Some(3.0)]);
    }

    #[test]
    fn test_correlation_of_scaled_copy() {
        let a: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let b: Vec<Option<f64>> = (0..10).map(|i| Some(100.0 - 2.0 * i as f64)).collect();
        let frame = frame_with(&[("A_Close", a), ("B_Close", b)]);
        let matrix = close_correlation(&frame).unwrap();

        assert_eq!(matrix.tickers, vec!["A".to_string(), "B".to_string()]);
        assert!((matrix.get("A", "B").unwrap() + 1.0).abs() < 1e-12);
        assert!((matrix.get("A", "A").unwrap() - 1.0).abs() < 1e-12);
    }
}
