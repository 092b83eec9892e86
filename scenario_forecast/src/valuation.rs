//! Price-to-earnings comparison across tickers

use crate::error::Result;
use crate::providers::{ValuationProvider, ValuationRatios};
use serde::Serialize;
use tracing::warn;

/// Ratios gathered for a ticker list. A ticker missing either ratio is left
/// out of the matching column and listed in `missing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValuationComparison {
    /// `(ticker, trailing P/E)` in request order
    pub trailing: Vec<(String, f64)>,
    /// `(ticker, forward P/E)` in request order
    pub forward: Vec<(String, f64)>,
    pub missing: Vec<String>,
}

impl ValuationComparison {
    /// Collect ratios for every ticker; provider errors propagate
    pub fn collect<P: ValuationProvider + ?Sized>(provider: &P, tickers: &[String]) -> Result<Self> {
        let ratios = tickers
            .iter()
            .map(|t| provider.valuation(t))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ratios(&ratios))
    }

    pub fn from_ratios(ratios: &[ValuationRatios]) -> Self {
        let mut comparison = Self::default();

        for r in ratios {
            match r.trailing_pe {
                Some(pe) if pe.is_finite() => comparison.trailing.push((r.ticker.clone(), pe)),
                _ => warn!(ticker = %r.ticker, "trailing P/E unavailable"),
            }
            match r.forward_pe {
                Some(pe) if pe.is_finite() => comparison.forward.push((r.ticker.clone(), pe)),
                _ => warn!(ticker = %r.ticker, "forward P/E unavailable"),
            }
            if r.trailing_pe.is_none() || r.forward_pe.is_none() {
                comparison.missing.push(r.ticker.clone());
            }
        }

        comparison
    }

    /// A chart needs at least one trailing and one forward ratio
    pub fn is_renderable(&self) -> bool {
        !self.trailing.is_empty() && !self.forward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(ticker: &str, trailing: Option<f64>, forward: Option<f64>) -> ValuationRatios {
        ValuationRatios {
            ticker: ticker.to_string(),
            trailing_pe: trailing,
            forward_pe: forward,
        }
    }

    #[test]
    fn test_missing_ratios_are_omitted() {
        let comparison = ValuationComparison::from_ratios(&[
            ratios("AAPL", Some(29.0), Some(27.5)),
            ratios("TSLA", None, Some(60.0)),
        ]);

        assert_eq!(comparison.trailing, vec![("AAPL".to_string(), 29.0)]);
        assert_eq!(comparison.forward.len(), 2);
        assert_eq!(comparison.missing, vec!["TSLA".to_string()]);
        assert!(comparison.is_renderable());
    }

    #[test]
    fn test_not_renderable_without_forward() {
        let comparison = ValuationComparison::from_ratios(&[ratios("MSFT", Some(35.0), None)]);
        assert!(!comparison.is_renderable());
    }
}
