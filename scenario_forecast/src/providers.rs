//! Sources of daily price history and valuation ratios

use crate::data::Bar;
use crate::error::{ForecastError, Result};
use crate::utils::parse_date;
use chrono::{DateTime, NaiveDate, NaiveTime};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Daily OHLCV history for one ticker
pub trait MarketDataProvider {
    /// Bars for trading days in `[start, end)`, sorted by date.
    ///
    /// An unknown ticker or an empty range yields an empty vector.
    fn daily_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>>;
}

/// Price-to-earnings ratios of one ticker; either may be unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRatios {
    pub ticker: String,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
}

/// Source of valuation ratios
pub trait ValuationProvider {
    fn valuation(&self, ticker: &str) -> Result<ValuationRatios>;
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start >= end {
        return Err(ForecastError::InvalidParameter(format!(
            "Start date {} must be before end date {}",
            start, end
        )));
    }
    Ok(())
}

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-scenarios";

/// Yahoo Finance over blocking HTTP
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    quote_response: QuoteResults,
}

#[derive(Debug, Deserialize)]
struct QuoteResults {
    #[serde(default)]
    result: Vec<QuoteSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummary {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<f64>,
}

impl YahooProvider {
    /// Create a provider whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(YAHOO_BASE_URL, timeout)
    }

    /// Provider against a different host, for mirrors and proxies
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "requesting");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::ProviderError(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }
        Ok(response.json::<T>()?)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

impl MarketDataProvider for YahooProvider {
    fn daily_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        check_range(start, end)?;
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            ticker,
            unix_seconds(start),
            unix_seconds(end)
        );
        let body: ChartResponse = self.get_json(&url)?;

        if let Some(error) = body.chart.error.filter(|e| !e.is_null()) {
            return Err(ForecastError::ProviderError(format!("{}: {}", ticker, error)));
        }
        let Some(result) = body.chart.result.and_then(|mut r| r.pop()) else {
            return Ok(Vec::new());
        };
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let field = |values: &[Option<f64>]| values.get(i).copied().flatten();

            // skip days without a full price bar
            let (Some(open), Some(high), Some(low), Some(close)) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
            ) else {
                continue;
            };

            let date = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| ForecastError::ProviderError(format!("Bad timestamp {}", ts)))?
                .date_naive();
            if date < start || date >= end {
                continue;
            }

            bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume: field(&quote.volume).unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

impl ValuationProvider for YahooProvider {
    fn valuation(&self, ticker: &str) -> Result<ValuationRatios> {
        let url = format!("{}/v7/finance/quote?symbols={}", self.base_url, ticker);
        let body: QuoteResponse = self.get_json(&url)?;
        let summary = body.quote_response.result.into_iter().next();

        Ok(ValuationRatios {
            ticker: ticker.to_string(),
            trailing_pe: summary.as_ref().and_then(|s| s.trailing_pe),
            forward_pe: summary.as_ref().and_then(|s| s.forward_pe),
        })
    }
}

/// Offline provider reading `<dir>/<TICKER>.csv` and `<dir>/valuations.csv`
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume", default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ValuationRecord {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "TrailingPE", default)]
    trailing_pe: Option<f64>,
    #[serde(rename = "ForwardPE", default)]
    forward_pe: Option<f64>,
}

impl CsvDirectoryProvider {
    pub const VALUATIONS_FILE: &'static str = "valuations.csv";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn history_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

impl MarketDataProvider for CsvDirectoryProvider {
    fn daily_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        check_range(start, end)?;
        let path = self.history_path(ticker);
        if !path.exists() {
            warn!(ticker, path = %path.display(), "no history file for ticker");
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let mut bars = Vec::new();
        for record in reader.deserialize::<BarRecord>() {
            let record = record?;
            let date = parse_date(&record.date)?;
            if date < start || date >= end {
                continue;
            }
            bars.push(Bar {
                date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume.unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl ValuationProvider for CsvDirectoryProvider {
    fn valuation(&self, ticker: &str) -> Result<ValuationRatios> {
        let path = self.dir.join(Self::VALUATIONS_FILE);
        let mut ratios = ValuationRatios {
            ticker: ticker.to_string(),
            trailing_pe: None,
            forward_pe: None,
        };
        if !path.exists() {
            return Ok(ratios);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;
        for record in reader.deserialize::<ValuationRecord>() {
            let record = record?;
            if record.ticker.eq_ignore_ascii_case(ticker) {
                ratios.trailing_pe = record.trailing_pe;
                ratios.forward_pe = record.forward_pe;
                break;
            }
        }

        Ok(ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_payload_decodes() {
        let payload = r#"{"chart":{"result":[{"timestamp":[1704205800],
            "indicators":{"quote":[{"open":[187.1],"high":[188.4],"low":[183.9],
            "close":[185.6],"volume":[82488700]}]}}],"error":null}}"#;
        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let result = body.chart.result.unwrap();

        assert_eq!(result[0].timestamp, vec![1704205800]);
        assert_eq!(result[0].indicators.quote[0].close, vec![Some(185.6)]);
    }

    #[test]
    fn test_quote_payload_decodes() {
        let payload = r#"{"quoteResponse":{"result":[{"symbol":"AAPL","trailingPE":29.5}]}}"#;
        let body: QuoteResponse = serde_json::from_str(payload).unwrap();

        assert_eq!(body.quote_response.result[0].trailing_pe, Some(29.5));
        assert_eq!(body.quote_response.result[0].forward_pe, None);
    }

    #[test]
    fn test_unix_seconds() {
        let date = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        assert_eq!(unix_seconds(date), 1_293_840_000);
    }
}
