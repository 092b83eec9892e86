//! Hypothetical market conditions applied to a price series

use crate::data::PriceSeries;
use crate::error::ForecastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market condition tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Bullish,
    Bearish,
    Neutral,
}

impl Scenario {
    /// Every scenario, in display order
    pub const ALL: [Scenario; 3] = [Scenario::Bullish, Scenario::Bearish, Scenario::Neutral];

    /// Multiplicative price shock
    pub fn multiplier(self) -> f64 {
        match self {
            Scenario::Bullish => 1.2,
            Scenario::Bearish => 0.8,
            Scenario::Neutral => 1.0,
        }
    }

    /// Shock every value of the series. Neutral returns an unchanged copy.
    pub fn adjust(self, series: &PriceSeries) -> PriceSeries {
        match self {
            Scenario::Neutral => series.clone(),
            _ => {
                let multiplier = self.multiplier();
                series.map_values(|v| v * multiplier)
            }
        }
    }

    /// Interpret a prompt answer: `BULL` or `BEAR`, trimmed, any case
    pub fn from_prompt(input: &str) -> Option<Scenario> {
        match input.trim().to_uppercase().as_str() {
            "BULL" => Some(Scenario::Bullish),
            "BEAR" => Some(Scenario::Bearish),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Bullish => "Bullish",
            Scenario::Bearish => "Bearish",
            Scenario::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scenario {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" | "bull" => Ok(Scenario::Bullish),
            "bearish" | "bear" => Ok(Scenario::Bearish),
            "neutral" => Ok(Scenario::Neutral),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown scenario '{}'",
                other
            ))),
        }
    }
}
